//! Lossless `pom.xml` reading and editing
//!
//! The descriptor is parsed once with `quick-xml` to locate the handful of
//! elements releaser cares about (artifact id, version, parent, properties).
//! Edits replace only the text between the start and end tag of the
//! touched element; every other byte of the file is written back as read.

use crate::core::error::{ReleaseError, ReleaseResult};
use crate::pom::versions::{VERSION_PROPERTY_SUFFIX, is_snapshot};
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// File name of a build descriptor
pub const POM_FILE_NAME: &str = "pom.xml";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Element text located in the source document
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
  value: String,
  /// Byte range of the trimmed text; `None` when the element cannot be
  /// rewritten in place (self-closing, mixed content, CDATA)
  span: Option<Range<usize>>,
}

/// Element of a descriptor that carries a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionElement {
  /// `/project/version`
  Version,
  /// `/project/parent/version`
  ParentVersion,
  /// `/project/properties/<name>`
  Property(String),
}

impl VersionElement {
  /// Render the element the way it appears in the descriptor
  pub fn describe(&self, value: &str) -> String {
    match self {
      VersionElement::Version => format!("<version>{}</version>", value),
      VersionElement::ParentVersion => format!("<parent><version>{}</version></parent>", value),
      VersionElement::Property(name) => format!("<{name}>{value}</{name}>"),
    }
  }
}

/// One applied rewrite
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VersionChange {
  pub element: String,
  pub from: String,
  pub to: String,
}

#[derive(Debug, Clone)]
struct Edit {
  span: Range<usize>,
  value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
  ArtifactId,
  Version,
  ParentArtifactId,
  ParentVersion,
  Property,
}

impl Slot {
  fn classify(path: &[String]) -> Option<Self> {
    let path: Vec<&str> = path.iter().map(String::as_str).collect();
    match path.as_slice() {
      ["project", "artifactId"] => Some(Slot::ArtifactId),
      ["project", "version"] => Some(Slot::Version),
      ["project", "parent", "artifactId"] => Some(Slot::ParentArtifactId),
      ["project", "parent", "version"] => Some(Slot::ParentVersion),
      ["project", "properties", _] => Some(Slot::Property),
      _ => None,
    }
  }
}

/// Text capture of an element that is currently open
struct Capture {
  slot: Slot,
  name: String,
  depth: usize,
  inner_start: usize,
  value: String,
  mixed: bool,
}

/// A parsed `pom.xml` with pending edits
#[derive(Debug, Clone)]
pub struct PomDescriptor {
  path: PathBuf,
  content: String,
  artifact_id: Option<Field>,
  version: Option<Field>,
  parent_artifact_id: Option<Field>,
  parent_version: Option<Field>,
  /// Every occurrence of each property, in document order
  properties: IndexMap<String, Vec<Field>>,
  edits: Vec<Edit>,
}

impl PomDescriptor {
  /// Read and parse the descriptor at `path`
  pub fn read(path: &Path) -> ReleaseResult<Self> {
    let content = fs::read_to_string(path).map_err(|e| ReleaseError::descriptor(path, e))?;
    Self::parse(path, content)
  }

  /// Parse descriptor text; `path` is used for error reporting and writing
  pub fn parse(path: &Path, content: String) -> ReleaseResult<Self> {
    let mut pom = Self {
      path: path.to_path_buf(),
      content: String::new(),
      artifact_id: None,
      version: None,
      parent_artifact_id: None,
      parent_version: None,
      properties: IndexMap::new(),
      edits: Vec::new(),
    };

    // positions are kept relative to `content`, mark included
    let offset = if content.starts_with(BYTE_ORDER_MARK) {
      BYTE_ORDER_MARK.len_utf8()
    } else {
      0
    };
    let mut reader = Reader::from_str(&content[offset..]);
    let mut stack: Vec<String> = Vec::new();
    let mut capture: Option<Capture> = None;

    loop {
      let before = offset + reader.buffer_position() as usize;
      let event = reader
        .read_event()
        .map_err(|e| ReleaseError::descriptor(path, format!("invalid XML near byte {}: {}", before, e)))?;
      let after = offset + reader.buffer_position() as usize;

      match event {
        Event::Start(start) => {
          let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
          stack.push(name.clone());
          match capture.as_mut() {
            Some(open) => open.mixed = true,
            None => {
              if let Some(slot) = Slot::classify(&stack) {
                capture = Some(Capture {
                  slot,
                  name,
                  depth: stack.len(),
                  inner_start: after,
                  value: String::new(),
                  mixed: false,
                });
              }
            }
          }
        }
        Event::Empty(empty) => {
          if let Some(open) = capture.as_mut() {
            open.mixed = true;
            continue;
          }
          let name = String::from_utf8_lossy(empty.local_name().as_ref()).into_owned();
          stack.push(name.clone());
          if let Some(slot) = Slot::classify(&stack) {
            pom.store(slot, name, Field {
              value: String::new(),
              span: None,
            });
          }
          stack.pop();
        }
        Event::Text(text) => {
          if let Some(open) = capture.as_mut() {
            let text = text
              .unescape()
              .map_err(|e| ReleaseError::descriptor(path, format!("invalid text near byte {}: {}", before, e)))?;
            open.value.push_str(&text);
          }
        }
        Event::CData(cdata) => {
          if let Some(open) = capture.as_mut() {
            open.value.push_str(&String::from_utf8_lossy(&cdata));
            open.mixed = true;
          }
        }
        Event::End(_) => {
          if let Some(open) = capture.take_if(|open| open.depth == stack.len()) {
            let span = (!open.mixed).then(|| trimmed_span(&content, open.inner_start..before));
            let value = open.value.trim().to_string();
            pom.store(open.slot, open.name, Field { value, span });
          }
          stack.pop();
        }
        Event::Eof => break,
        _ => {
          if let Some(open) = capture.as_mut() {
            open.mixed = true;
          }
        }
      }
    }

    drop(reader);

    if pom.artifact_id.is_none() && pom.parent_artifact_id.is_none() {
      tracing::debug!("{} declares no artifactId", path.display());
    }

    pom.content = content;
    Ok(pom)
  }

  fn store(&mut self, slot: Slot, name: String, field: Field) {
    match slot {
      Slot::ArtifactId => self.artifact_id = Some(field),
      Slot::Version => self.version = Some(field),
      Slot::ParentArtifactId => self.parent_artifact_id = Some(field),
      Slot::ParentVersion => self.parent_version = Some(field),
      Slot::Property => self.properties.entry(name).or_default().push(field),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn artifact_id(&self) -> Option<&str> {
    self.artifact_id.as_ref().map(|f| f.value.as_str())
  }

  pub fn version(&self) -> Option<&str> {
    self.version.as_ref().map(|f| f.value.as_str())
  }

  pub fn parent_artifact_id(&self) -> Option<&str> {
    self.parent_artifact_id.as_ref().map(|f| f.value.as_str())
  }

  pub fn parent_version(&self) -> Option<&str> {
    self.parent_version.as_ref().map(|f| f.value.as_str())
  }

  /// Declared properties in document order
  ///
  /// A property declared more than once takes its last value.
  pub fn properties(&self) -> IndexMap<String, String> {
    self
      .properties
      .iter()
      .filter_map(|(name, fields)| Some((name.clone(), fields.last()?.value.clone())))
      .collect()
  }

  pub fn property(&self, name: &str) -> Option<&str> {
    self.properties.get(name)?.last().map(|f| f.value.as_str())
  }

  /// Rewrite a version element
  ///
  /// Every occurrence of a repeated property is rewritten. Returns the change
  /// if any value differed. Elements that are absent, or that cannot be
  /// rewritten in place, are left alone.
  pub fn set(&mut self, element: &VersionElement, value: &str) -> Option<VersionChange> {
    let fields: Vec<&mut Field> = match element {
      VersionElement::Version => self.version.iter_mut().collect(),
      VersionElement::ParentVersion => self.parent_version.iter_mut().collect(),
      VersionElement::Property(name) => self
        .properties
        .get_mut(name)
        .map(|fields| fields.iter_mut().collect())
        .unwrap_or_default(),
    };

    let mut from = None;
    for field in fields {
      if field.value == value {
        continue;
      }
      let Some(span) = field.span.clone() else {
        tracing::warn!(
          "{}: cannot rewrite {} in place, leaving it as is",
          self.path.display(),
          element.describe(&field.value)
        );
        continue;
      };

      let previous = std::mem::replace(&mut field.value, value.to_string());
      if from.is_none() {
        from = Some(previous);
      }
      self.edits.retain(|edit| edit.span != span);
      self.edits.push(Edit {
        span,
        value: quick_xml::escape::escape(value).into_owned(),
      });
    }

    from.map(|from| VersionChange {
      element: element.describe(value),
      from,
      to: value.to_string(),
    })
  }

  /// Are there edits not yet written?
  pub fn is_modified(&self) -> bool {
    !self.edits.is_empty()
  }

  /// Descriptor text with all edits applied
  pub fn render(&self) -> String {
    let mut edits: Vec<&Edit> = self.edits.iter().collect();
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut rendered = self.content.clone();
    for edit in edits {
      rendered.replace_range(edit.span.clone(), &edit.value);
    }
    rendered
  }

  /// Write pending edits back to disk
  ///
  /// Untouched descriptors are not written at all. Returns whether the file
  /// was written.
  pub fn write(self) -> ReleaseResult<bool> {
    if !self.is_modified() {
      return Ok(false);
    }
    fs::write(&self.path, self.render()).map_err(|e| ReleaseError::descriptor(&self.path, e))?;
    Ok(true)
  }

  /// Version elements that still point at a snapshot
  ///
  /// Covers the project version, the parent version and every
  /// `*.version` property.
  pub fn snapshot_elements(&self) -> Vec<String> {
    let mut offenders = Vec::new();
    let mut check = |element: VersionElement, value: &str| {
      if is_snapshot(value) {
        offenders.push(element.describe(value));
      }
    };

    if let Some(version) = self.version() {
      check(VersionElement::Version, version);
    }
    if let Some(version) = self.parent_version() {
      check(VersionElement::ParentVersion, version);
    }
    for (name, fields) in &self.properties {
      if name.ends_with(VERSION_PROPERTY_SUFFIX) {
        for field in fields {
          check(VersionElement::Property(name.clone()), &field.value);
        }
      }
    }
    offenders
  }
}

/// Narrow `range` to the non-whitespace part of the text it covers
fn trimmed_span(content: &str, range: Range<usize>) -> Range<usize> {
  let raw = &content[range.clone()];
  let leading = raw.len() - raw.trim_start().len();
  let trailing = raw.len() - raw.trim_end().len();
  if leading == raw.len() {
    return range.start..range.start;
  }
  range.start + leading..range.end - trailing
}
