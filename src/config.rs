use crate::error::{PlantifulError, Result};
use crate::models::FrequencyUnit;
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub owner: OwnerConfig,
    pub garden: GardenConfig,
    #[serde(default)]
    pub care: CareConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OwnerConfig {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GardenConfig {
    pub name: String,
}

/// Defaults applied to newly added plants.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CareConfig {
    pub default_frequency_scalar: i64,
    pub default_frequency_unit: String,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            default_frequency_scalar: 3,
            default_frequency_unit: "day".into(),
        }
    }
}

impl CareConfig {
    pub fn default_frequency(&self) -> Result<(i64, FrequencyUnit)> {
        let unit = FrequencyUnit::from_str(&self.default_frequency_unit).ok_or_else(|| {
            PlantifulError::InvalidFrequency {
                scalar: self.default_frequency_scalar,
                unit: self.default_frequency_unit.clone(),
            }
        })?;
        if self.default_frequency_scalar < 1 {
            return Err(PlantifulError::InvalidFrequency {
                scalar: self.default_frequency_scalar,
                unit: self.default_frequency_unit.clone(),
            });
        }
        Ok((self.default_frequency_scalar, unit))
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(PlantifulError::Config(format!(
                "Config file not found at {:?}. Run `plantiful init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| PlantifulError::Config(format!("Failed to read config: {}", e)))?;

        // Substitute environment variables
        let config_str = Self::substitute_env_vars(&config_str);

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| PlantifulError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("plantiful").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        // Return XDG path as the default (will trigger "not found" in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| PlantifulError::Config("Cannot determine config directory".into()))?
            .join("plantiful")
            .join("config.yaml");
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/plantiful/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PlantifulError::Config("Cannot determine config directory".into()))?
            .join("plantiful");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up Plantiful!");
        println!();

        println!("Owner");
        let first_name: String = Input::new()
            .with_prompt("  First name")
            .interact_text()
            .map_err(|e| PlantifulError::Config(format!("Input error: {}", e)))?;

        let last_name: String = Input::new()
            .with_prompt("  Last name")
            .interact_text()
            .map_err(|e| PlantifulError::Config(format!("Input error: {}", e)))?;

        let email: String = Input::new()
            .with_prompt("  Email")
            .interact_text()
            .map_err(|e| PlantifulError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Garden");
        let garden_name: String = Input::new()
            .with_prompt("  Garden name")
            .default(format!("{}'s Garden", first_name))
            .interact_text()
            .map_err(|e| PlantifulError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Care defaults (applied to newly added plants)");
        let scalar: i64 = Input::new()
            .with_prompt("  Check every")
            .default(3)
            .interact_text()
            .map_err(|e| PlantifulError::Config(format!("Input error: {}", e)))?;

        let unit: String = Input::new()
            .with_prompt("  Unit (day or week)")
            .default("day".into())
            .validate_with(|value: &String| match FrequencyUnit::from_str(value) {
                Some(_) => Ok(()),
                None => Err("must be 'day' or 'week'"),
            })
            .interact_text()
            .map_err(|e| PlantifulError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            owner: OwnerConfig {
                first_name,
                last_name,
                email,
            },
            garden: GardenConfig { name: garden_name },
            care: CareConfig {
                default_frequency_scalar: scalar,
                default_frequency_unit: unit,
            },
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| PlantifulError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# Plantiful Configuration\n# Generated by `plantiful init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    /// Persist the current configuration, e.g. after editing care defaults
    /// in the settings screen.
    pub fn save(&self, config_override: Option<&PathBuf>) -> Result<PathBuf> {
        let config_path = match config_override {
            Some(p) => p.clone(),
            None => Self::default_config_path()?,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| PlantifulError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, yaml)?;
        Ok(config_path)
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("PLANTIFUL_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| PlantifulError::Config("Cannot determine data directory".into()))?
            .join("plantiful");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("plantiful.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: OwnerConfig {
                first_name: "Uncle".into(),
                last_name: "Tony".into(),
                email: "uncletony@example.com".into(),
            },
            garden: GardenConfig {
                name: "Uncle's Garden".into(),
            },
            care: CareConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_frequency_resolves() {
        let care = CareConfig::default();
        let (scalar, unit) = care.default_frequency().unwrap();
        assert_eq!(scalar, 3);
        assert_eq!(unit, FrequencyUnit::Day);
    }

    #[test]
    fn default_frequency_rejects_bad_unit() {
        let care = CareConfig {
            default_frequency_scalar: 2,
            default_frequency_unit: "fortnight".into(),
        };
        assert!(care.default_frequency().is_err());
    }

    #[test]
    fn default_frequency_rejects_zero_scalar() {
        let care = CareConfig {
            default_frequency_scalar: 0,
            default_frequency_unit: "week".into(),
        };
        assert!(care.default_frequency().is_err());
    }

    #[test]
    fn config_parses_from_yaml() {
        let yaml = r#"
owner:
  first_name: Ada
  last_name: Lovelace
  email: ada@example.com
garden:
  name: Window Sill
care:
  default_frequency_scalar: 1
  default_frequency_unit: week
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.owner.first_name, "Ada");
        assert_eq!(config.garden.name, "Window Sill");
        assert_eq!(config.care.default_frequency_scalar, 1);
    }
}
