//! TOML-driven registry construction.

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::registry::BlockRegistry;

#[derive(Deserialize)]
pub struct RegistryConfig {
    pub materials: HashMap<String, MaterialEntry>,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum MaterialEntry {
    // Simple: material = [r, g, b, a]
    Color([f32; 4]),
    // Detailed: material = { texture = "...", alpha_test = true, liquid = false }
    Detail {
        color: Option<[f32; 4]>,
        texture: Option<String>,
        #[serde(default)]
        alpha_test: bool,
        #[serde(default)]
        liquid: bool,
    },
}

#[derive(Deserialize)]
pub struct BlockDef {
    pub name: Option<String>,
    pub materials: Vec<String>,
    pub solid: Option<bool>,
}

impl BlockRegistry {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: RegistryConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_config(cfg: RegistryConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = BlockRegistry::new();
        let mut entries: Vec<(String, MaterialEntry)> = cfg.materials.into_iter().collect();
        // HashMap iteration order is nondeterministic; sort keys so
        // MaterialId assignment is stable.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, entry) in entries {
            match entry {
                MaterialEntry::Color(color) => {
                    reg.add_material_of_color(&key, color, false)?;
                }
                MaterialEntry::Detail {
                    color,
                    texture,
                    alpha_test,
                    liquid,
                } => {
                    let color = color.unwrap_or([1.0, 1.0, 1.0, 1.0]);
                    match texture {
                        Some(tex) => {
                            reg.add_material_of_texture(&key, &tex, alpha_test, color, liquid)?;
                        }
                        None => {
                            reg.add_material_of_color(&key, color, liquid)?;
                        }
                    }
                }
            }
        }
        for def in cfg.blocks {
            let names: Vec<&str> = def.materials.iter().map(|s| s.as_str()).collect();
            let block = reg.add_block(&names, def.solid.unwrap_or(true))?;
            if let Some(name) = def.name {
                reg.name_block(&name, block);
            }
        }
        Ok(reg)
    }
}
