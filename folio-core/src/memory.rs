//! In-memory page and preference store, for tests and offline tooling.

use std::collections::BTreeMap;

use crate::apply::{Marker, PageSurface, TypingSource};
use crate::timeline::{ContentBlock, TimelineContainer, TimelineEntry, TimelinePoint};
use crate::{I18nError, LocaleCode, PreferenceStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub html: String,
    pub attributes: BTreeMap<String, String>,
    pub typing_source: bool,
}

/// Where a tagged element lives on a [`MemoryPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryNode {
    Element(usize),
    Block { timeline: usize, index: usize },
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    pub lang: Option<LocaleCode>,
    pub indicator: String,
    pub elements: Vec<MemoryElement>,
    pub timelines: Vec<TimelineContainer>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element tagged with `marker` and return its index.
    pub fn push_tagged(&mut self, marker: Marker, key: &str, html: &str) -> usize {
        let mut attributes = BTreeMap::new();
        attributes.insert(marker.key_attribute().to_string(), key.to_string());
        self.elements.push(MemoryElement {
            html: html.to_string(),
            attributes,
            typing_source: false,
        });
        self.elements.len() - 1
    }

    pub fn push_text(&mut self, key: &str, html: &str) -> usize {
        self.push_tagged(Marker::Text, key, html)
    }

    /// Add a text-tagged element inside the typing source list.
    pub fn push_typing_source(&mut self, key: &str, text: &str) -> usize {
        let index = self.push_text(key, text);
        self.elements[index].typing_source = true;
        index
    }

    pub fn push_timeline(&mut self, timeline: TimelineContainer) -> usize {
        self.timelines.push(timeline);
        self.timelines.len() - 1
    }

    pub fn html(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(|el| el.html.as_str())
    }

    pub fn attribute(&self, index: usize, name: &str) -> Option<&str> {
        self.elements
            .get(index)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    pub fn timeline(&self, id: &str) -> Option<&TimelineContainer> {
        self.timelines.iter().find(|t| t.id == id)
    }

    fn timeline_position(&self, id: &str) -> Option<usize> {
        self.timelines.iter().position(|t| t.id == id)
    }

    fn attributes_mut(&mut self, node: &MemoryNode) -> Result<&mut BTreeMap<String, String>, I18nError> {
        let found = match *node {
            MemoryNode::Element(index) => self.elements.get_mut(index).map(|el| &mut el.attributes),
            MemoryNode::Block { timeline, index } => self
                .timelines
                .get_mut(timeline)
                .and_then(|t| t.block_mut(index))
                .map(|block| &mut block.attributes),
        };
        found.ok_or_else(|| I18nError::Surface(format!("stale node {node:?}")))
    }
}

impl PageSurface for MemoryPage {
    type Node = MemoryNode;
    type Block = ContentBlock;

    fn tagged(&self, marker: Marker) -> Vec<(MemoryNode, String)> {
        let key_attribute = marker.key_attribute();
        let mut found: Vec<(MemoryNode, String)> = self
            .elements
            .iter()
            .enumerate()
            .filter_map(|(index, el)| {
                el.attributes
                    .get(key_attribute)
                    .map(|key| (MemoryNode::Element(index), key.clone()))
            })
            .collect();

        for (timeline, container) in self.timelines.iter().enumerate() {
            for index in 0..container.children.len() {
                let key = container
                    .block(index)
                    .and_then(|block| block.attributes.get(key_attribute));
                if let Some(key) = key {
                    found.push((MemoryNode::Block { timeline, index }, key.clone()));
                }
            }
        }
        found
    }

    fn set_html(&mut self, node: &MemoryNode, html: &str) -> Result<(), I18nError> {
        match *node {
            MemoryNode::Element(index) => {
                let el = self
                    .elements
                    .get_mut(index)
                    .ok_or_else(|| I18nError::Surface(format!("no element {index}")))?;
                el.html = html.to_string();
            }
            MemoryNode::Block { timeline, index } => {
                let block = self
                    .timelines
                    .get_mut(timeline)
                    .and_then(|t| t.block_mut(index))
                    .ok_or_else(|| I18nError::Surface(format!("no block {timeline}/{index}")))?;
                block.html = html.to_string();
            }
        }
        Ok(())
    }

    fn set_attribute(&mut self, node: &MemoryNode, name: &str, value: &str) -> Result<(), I18nError> {
        self.attributes_mut(node)?
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_locale_indicator(&mut self, label: &str) {
        self.indicator = label.to_string();
    }

    fn set_document_locale(&mut self, locale: LocaleCode) {
        self.lang = Some(locale);
    }

    fn typing_sources(&self) -> Vec<TypingSource> {
        let key_attribute = Marker::Text.key_attribute();
        self.elements
            .iter()
            .filter(|el| el.typing_source)
            .filter_map(|el| {
                el.attributes.get(key_attribute).map(|key| TypingSource {
                    key: key.clone(),
                    text: text_content(&el.html),
                })
            })
            .collect()
    }

    fn take_timeline(&mut self, container_id: &str) -> Option<Vec<TimelineEntry<ContentBlock>>> {
        let position = self.timeline_position(container_id)?;
        Some(self.timelines[position].take_entries())
    }

    fn put_timeline(
        &mut self,
        container_id: &str,
        points: Vec<TimelinePoint<ContentBlock>>,
    ) -> Result<(), I18nError> {
        let position = self
            .timeline_position(container_id)
            .ok_or_else(|| I18nError::Surface(format!("no timeline #{container_id}")))?;
        self.timelines[position].put_points(points);
        Ok(())
    }
}

/// Rendered text of an HTML fragment: tags dropped, entities decoded.
pub fn text_content(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&text).into_owned()
}

/// Preference store backed by a plain field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    pub stored: Option<String>,
    pub writes: usize,
}

impl MemoryPreferences {
    pub fn with_stored(value: impl Into<String>) -> Self {
        Self {
            stored: Some(value.into()),
            writes: 0,
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self) -> Option<String> {
        self.stored.clone()
    }

    fn save(&mut self, locale: LocaleCode) {
        self.stored = Some(locale.as_str().to_string());
        self.writes += 1;
    }
}
