use folio_core::apply::{Marker, PageSurface, TypingSource};
use folio_core::timeline::{
    ContentNode, TimelineEntry, TimelinePoint, BLOCK_CLASS, CONTENT_CLASS, DATE_ATTRIBUTE,
    DATE_CLASS, ICON_CLASS, POINT_CLASS,
};
use folio_core::{I18nError, LocaleCode};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

pub(crate) const TYPING_SOURCES: &str = "#lead-texts-to-type [data-i18n]";
pub(crate) const LOCALE_INDICATOR_ID: &str = "current-lang";

pub(crate) fn js_error_text(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        String::from(err.message())
    } else {
        err.as_string().unwrap_or_else(|| "(JavaScript Error)".to_string())
    }
}

fn surface_error(err: JsValue) -> I18nError {
    I18nError::Surface(js_error_text(&err))
}

/// A content block element inside a timeline container.
#[derive(Debug, Clone)]
pub struct DomBlock(pub Element);

impl ContentNode for DomBlock {
    fn date_label(&self) -> Option<String> {
        self.0
            .get_attribute(DATE_ATTRIBUTE)
            .map(|date| date.trim().to_string())
            .filter(|date| !date.is_empty())
    }

    fn set_content_marker(&mut self, on: bool) {
        let classes = self.0.class_list();
        let result = if on {
            classes.add_1(CONTENT_CLASS)
        } else {
            classes.remove_1(CONTENT_CLASS)
        };
        if let Err(err) = result {
            log::warn!("content marker not updated: {}", js_error_text(&err));
        }
    }
}

/// The live document.
pub struct DomPage {
    document: Document,
}

impl DomPage {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                log::error!("selector {selector:?} failed: {}", js_error_text(&err));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn create(&self, tag: &str, class: &str) -> Result<Element, I18nError> {
        let element = self.document.create_element(tag).map_err(surface_error)?;
        element.set_class_name(class);
        Ok(element)
    }

    fn build_point(&self, point: TimelinePoint<DomBlock>) -> Result<Element, I18nError> {
        let wrapper = self.create("div", POINT_CLASS)?;
        let icon_box = self.create("div", ICON_CLASS)?;
        let icon = self.create("i", &point.icon)?;
        let block = self.create("div", BLOCK_CLASS)?;

        icon_box.append_child(&icon).map_err(surface_error)?;
        if let Some(date) = &point.date {
            let label = self.create("span", DATE_CLASS)?;
            label.set_text_content(Some(date));
            block.append_child(&label).map_err(surface_error)?;
        }
        block.append_child(&point.content.0).map_err(surface_error)?;
        wrapper.append_child(&icon_box).map_err(surface_error)?;
        wrapper.append_child(&block).map_err(surface_error)?;
        Ok(wrapper)
    }
}

impl PageSurface for DomPage {
    type Node = Element;
    type Block = DomBlock;

    fn tagged(&self, marker: Marker) -> Vec<(Element, String)> {
        let key_attribute = marker.key_attribute();
        self.query_all(&format!("[{key_attribute}]"))
            .into_iter()
            .filter_map(|element| {
                let key = element.get_attribute(key_attribute)?;
                Some((element, key))
            })
            .collect()
    }

    fn set_html(&mut self, node: &Element, html: &str) -> Result<(), I18nError> {
        node.set_inner_html(html);
        Ok(())
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<(), I18nError> {
        node.set_attribute(name, value).map_err(surface_error)
    }

    fn set_locale_indicator(&mut self, label: &str) {
        if let Some(indicator) = self.document.get_element_by_id(LOCALE_INDICATOR_ID) {
            indicator.set_text_content(Some(label));
        }
    }

    fn set_document_locale(&mut self, locale: LocaleCode) {
        if let Some(root) = self.document.document_element() {
            if let Err(err) = root.set_attribute("lang", locale.as_str()) {
                log::warn!("lang attribute not set: {}", js_error_text(&err));
            }
        }
    }

    fn typing_sources(&self) -> Vec<TypingSource> {
        let key_attribute = Marker::Text.key_attribute();
        self.query_all(TYPING_SOURCES)
            .into_iter()
            .filter_map(|element| {
                let key = element.get_attribute(key_attribute)?;
                Some(TypingSource {
                    key,
                    text: element.text_content().unwrap_or_default(),
                })
            })
            .collect()
    }

    fn take_timeline(&mut self, container_id: &str) -> Option<Vec<TimelineEntry<DomBlock>>> {
        let container = self.document.get_element_by_id(container_id)?;
        let children = container.children();
        let children: Vec<Element> = (0..children.length())
            .filter_map(|index| children.item(index))
            .collect();

        let content_selector = format!(".{CONTENT_CLASS}");
        let date_selector = format!(".{DATE_CLASS}");
        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            if child.class_list().contains(POINT_CLASS) {
                if let Ok(Some(label)) = child.query_selector(&date_selector) {
                    label.remove();
                }
                match child.query_selector(&content_selector) {
                    Ok(Some(content)) => {
                        content.remove();
                        entries.push(TimelineEntry::Decorated(DomBlock(content)));
                    }
                    _ => log::warn!("#{container_id}: decorated point without content dropped"),
                }
            } else if child.tag_name().eq_ignore_ascii_case("div") {
                child.remove();
                entries.push(TimelineEntry::Raw(DomBlock(child)));
            }
        }

        container.set_inner_html("");
        Some(entries)
    }

    fn put_timeline(
        &mut self,
        container_id: &str,
        points: Vec<TimelinePoint<DomBlock>>,
    ) -> Result<(), I18nError> {
        let container = self
            .document
            .get_element_by_id(container_id)
            .ok_or_else(|| I18nError::Surface(format!("no element #{container_id}")))?;
        for point in points {
            let wrapper = self.build_point(point)?;
            container.append_child(&wrapper).map_err(surface_error)?;
        }
        Ok(())
    }
}
