use crate::error::ConfigError;

/// The fixed placeholder vocabulary available to destination-path and URI
/// templates. Absent values render as their documented defaults
/// (`episode_no` is 0 until numbering has begun).
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    entries: Vec<(&'static str, String)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.entries.push((name, value.into()));
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Substitute `{name}` placeholders in a template string. A placeholder that
/// is not in the vocabulary is a hard configuration error, as is an
/// unterminated `{`.
pub fn expand(template: &str, placeholders: &Placeholders) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }

        let mut name = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => {
                    return Err(ConfigError::UnclosedPlaceholder {
                        template: template.to_string(),
                    });
                }
            }
        }

        match placeholders.get(&name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(ConfigError::UnknownPlaceholder {
                    name,
                    template: template.to_string(),
                });
            }
        }
    }

    Ok(out)
}
