// Content-type / extension classifier for download groups.

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct RequestGroup {
    pub files: Vec<FileEntry>,
}

// Matches only single-file groups: extension suffix match short-circuits
// before content-type lookup, which is exact, parameters included.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeCriteria {
    extensions: Vec<String>,
    content_types: Vec<String>,
}

impl ContentTypeCriteria {
    pub fn new(extensions: Vec<String>, content_types: Vec<String>) -> Self {
        Self {
            extensions,
            content_types,
        }
    }

    pub fn matches(&self, group: &RequestGroup) -> bool {
        if group.files.len() != 1 {
            return false;
        }
        let file = &group.files[0];

        if self.extensions.iter().any(|ext| file.path.ends_with(ext)) {
            return true;
        }

        self.content_types.iter().any(|ct| ct == &file.content_type)
    }
}
