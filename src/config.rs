use serde::Deserialize;

/// Runtime knobs for the execution core, loadable from a TOML file
/// rather than plumbing flags through every constructor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Reject `get_prop`/`put_prop` on properties whose stored length is
    /// neither 1 nor 2, rather than guessing at an interpretation.
    pub strict_property_size: bool,
    /// Maximum depth of the evaluation stack before a write is refused.
    pub max_stack_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            strict_property_size: true,
            max_stack_depth: 1024,
        }
    }
}

impl VmConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let cfg = VmConfig::default();
        assert!(cfg.strict_property_size);
        assert_eq!(cfg.max_stack_depth, 1024);
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = VmConfig::from_toml_str("max_stack_depth = 2048\n").unwrap();
        assert_eq!(cfg.max_stack_depth, 2048);
        assert!(cfg.strict_property_size);
    }
}
