//! `multipart/form-data` bodies.
//!
//! Admin create/update endpoints take form fields plus an optional image
//! file, so bodies are built as forms rather than JSON.

/// A file attached to a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Original file name sent to the server.
    pub filename: String,
    /// MIME type of the file.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Value of one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(FilePart),
}

/// One named form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub value: PartValue,
}

/// A multipart form under construction.
///
/// # Example
///
/// ```rust,ignore
/// let form = Form::new()
///     .text("name", "Chargers")
///     .file("image", "chargers.png", "image/png", bytes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Create an empty form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(format!("----gm-form-{:016x}", rand::random::<u64>()))
    }

    /// Create an empty form with a fixed boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Add a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Add a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            value: PartValue::File(FilePart {
                filename: filename.into(),
                content_type: content_type.into(),
                bytes: bytes.into(),
            }),
        });
        self
    }

    /// The boundary separating parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// All parts in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Value of the first text field called `name`.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.value {
            PartValue::Text(v) if p.name == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// The first file field called `name`.
    pub fn file_part(&self, name: &str) -> Option<&FilePart> {
        self.parts.iter().find_map(|p| match &p.value {
            PartValue::File(f) if p.name == name => Some(f),
            _ => None,
        })
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode the form as a request body.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match &part.value {
                PartValue::Text(value) => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape_quotes(&part.name)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(value.as_bytes());
                }
                PartValue::File(file) => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: {}\r\n\r\n",
                            escape_quotes(&part.name),
                            escape_quotes(&file.filename),
                            file.content_type
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(&file.bytes);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('"', "%22")
}
