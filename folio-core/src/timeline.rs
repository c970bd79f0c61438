//! Timeline decoration, rebuildable from either raw or decorated content.
//!
//! A container holds content blocks that are either bare ("raw") or wrapped
//! in point/icon/date markup ("decorated"). [`rebuild`] first normalizes every
//! entry back to its bare block, then decorates the blocks again with the
//! icon of the current call, so running it repeatedly never stacks markup.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

pub const POINT_CLASS: &str = "vtimeline-point";
pub const BLOCK_CLASS: &str = "vtimeline-block";
pub const CONTENT_CLASS: &str = "vtimeline-content";
pub const ICON_CLASS: &str = "vtimeline-icon";
pub const DATE_CLASS: &str = "vtimeline-date";
pub const DATE_ATTRIBUTE: &str = "data-date";

/// A user-authored timeline entry as seen by the transformer.
pub trait ContentNode {
    /// Date label read from the block's date attribute; blank counts as none.
    fn date_label(&self) -> Option<String>;

    /// Add or remove the decoration-only content class.
    fn set_content_marker(&mut self, on: bool);
}

/// One child of a container before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry<B> {
    Raw(B),
    /// Content block found inside a previous decoration. Its old icon and
    /// date label are not carried over.
    Decorated(B),
}

/// A decorated content block ready to be written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint<B> {
    pub icon: String,
    pub date: Option<String>,
    pub content: B,
}

/// Strip decoration from every entry, keeping document order.
pub fn normalize<B: ContentNode>(entries: Vec<TimelineEntry<B>>) -> Vec<B> {
    entries
        .into_iter()
        .map(|entry| match entry {
            TimelineEntry::Raw(block) => block,
            TimelineEntry::Decorated(mut block) => {
                block.set_content_marker(false);
                block
            }
        })
        .collect()
}

/// Wrap bare blocks as timeline points carrying `icon`.
pub fn decorate<B: ContentNode>(blocks: Vec<B>, icon: &str) -> Vec<TimelinePoint<B>> {
    blocks
        .into_iter()
        .map(|mut content| {
            content.set_content_marker(true);
            TimelinePoint {
                icon: icon.to_string(),
                date: content.date_label(),
                content,
            }
        })
        .collect()
}

pub fn rebuild<B: ContentNode>(entries: Vec<TimelineEntry<B>>, icon: &str) -> Vec<TimelinePoint<B>> {
    decorate(normalize(entries), icon)
}

/// Detached content block with its attributes and inner markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub html: String,
}

impl ContentBlock {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn with_date(self, date: impl Into<String>) -> Self {
        self.with_attribute(DATE_ATTRIBUTE, date)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn write_html(&self, out: &mut String) {
        out.push_str("<div");
        if !self.classes.is_empty() {
            let _ = write!(
                out,
                " class=\"{}\"",
                html_escape::encode_double_quoted_attribute(&self.classes.join(" "))
            );
        }
        for (name, value) in &self.attributes {
            let _ = write!(
                out,
                " {name}=\"{}\"",
                html_escape::encode_double_quoted_attribute(value)
            );
        }
        out.push('>');
        out.push_str(&self.html);
        out.push_str("</div>");
    }
}

impl ContentNode for ContentBlock {
    fn date_label(&self) -> Option<String> {
        self.attributes
            .get(DATE_ATTRIBUTE)
            .map(|date| date.trim())
            .filter(|date| !date.is_empty())
            .map(str::to_string)
    }

    fn set_content_marker(&mut self, on: bool) {
        self.classes.retain(|class| class != CONTENT_CLASS);
        if on {
            self.classes.push(CONTENT_CLASS.to_string());
        }
    }
}

impl TimelinePoint<ContentBlock> {
    pub fn write_html(&self, out: &mut String) {
        let _ = write!(
            out,
            "<div class=\"{POINT_CLASS}\"><div class=\"{ICON_CLASS}\"><i class=\"{}\"></i></div><div class=\"{BLOCK_CLASS}\">",
            html_escape::encode_double_quoted_attribute(&self.icon)
        );
        if let Some(date) = &self.date {
            let _ = write!(
                out,
                "<span class=\"{DATE_CLASS}\">{}</span>",
                html_escape::encode_text(date)
            );
        }
        self.content.write_html(out);
        out.push_str("</div></div>");
    }
}

/// Immediate child of an in-memory container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum TimelineChild {
    Raw(ContentBlock),
    Point(TimelinePoint<ContentBlock>),
}

/// In-memory timeline container, identified by its element id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineContainer {
    pub id: String,
    #[serde(default)]
    pub children: Vec<TimelineChild>,
}

impl TimelineContainer {
    pub fn new(id: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        Self {
            id: id.into(),
            children: blocks.into_iter().map(TimelineChild::Raw).collect(),
        }
    }

    /// Detach every child as a normalization entry, leaving the container empty.
    pub fn take_entries(&mut self) -> Vec<TimelineEntry<ContentBlock>> {
        std::mem::take(&mut self.children)
            .into_iter()
            .map(|child| match child {
                TimelineChild::Raw(block) => TimelineEntry::Raw(block),
                TimelineChild::Point(point) => TimelineEntry::Decorated(point.content),
            })
            .collect()
    }

    pub fn put_points(&mut self, points: Vec<TimelinePoint<ContentBlock>>) {
        self.children = points.into_iter().map(TimelineChild::Point).collect();
    }

    pub fn rebuild(&mut self, icon: &str) {
        let entries = self.take_entries();
        self.put_points(rebuild(entries, icon));
    }

    pub fn is_decorated(&self) -> bool {
        self.children
            .iter()
            .all(|child| matches!(child, TimelineChild::Point(_)))
    }

    pub fn block(&self, index: usize) -> Option<&ContentBlock> {
        self.children.get(index).map(|child| match child {
            TimelineChild::Raw(block) => block,
            TimelineChild::Point(point) => &point.content,
        })
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut ContentBlock> {
        self.children.get_mut(index).map(|child| match child {
            TimelineChild::Raw(block) => block,
            TimelineChild::Point(point) => &mut point.content,
        })
    }

    /// Serialized children, as they would appear inside the container element.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                TimelineChild::Raw(block) => block.write_html(&mut out),
                TimelineChild::Point(point) => point.write_html(&mut out),
            }
        }
        out
    }
}
