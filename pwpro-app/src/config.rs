use anyhow::{Context, Result};
use log::{info, warn};
use pwpro_core::advisory::AdvisoryTable;
use pwpro_schemas::{
    chemical::Chemical,
    dilution::STANDARD_RATIO_PRESETS,
    file_formats::{AdvisoryRuleFile, ChemicalFile, PresetFile},
    rule::AdvisoryRule,
};
use std::{collections::HashMap, fs, path::Path, path::PathBuf};

/// Reference data loaded from YAML files.
///
/// Each kind lives in its own numbered subdirectory; a missing subdirectory
/// falls back to the built-in defaults.
pub struct KnowledgeBase {
    pub chemicals: HashMap<String, Chemical>,
    pub advisory_rules: Vec<AdvisoryRule>,
    pub ratio_presets: Vec<f64>,
}

impl KnowledgeBase {
    /// Loads all data from the given base directory.
    pub fn load(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref();
        info!("Loading knowledge base from '{}'...", base_path.display());

        let chemicals_dir = base_path.join("1_chemicals");
        let chemicals = if chemicals_dir.is_dir() {
            load_yaml_files_into_map(
                &chemicals_dir,
                |file: ChemicalFile| file.chemicals,
                |item: &Chemical| item.external_id.clone(),
            )?
        } else {
            warn!("{} not found, using built-in chemical list", chemicals_dir.display());
            builtin_chemicals()
                .into_iter()
                .map(|c| (c.external_id.clone(), c))
                .collect()
        };

        let rules_dir = base_path.join("2_advisory_rules");
        let advisory_rules = if rules_dir.is_dir() {
            load_yaml_files_in_order(&rules_dir, |file: AdvisoryRuleFile| file.rules)?
        } else {
            AdvisoryTable::standard().rules().to_vec()
        };

        let presets_dir = base_path.join("3_presets");
        let mut ratio_presets = if presets_dir.is_dir() {
            load_yaml_files_in_order(&presets_dir, |file: PresetFile| file.ratio_presets)?
        } else {
            STANDARD_RATIO_PRESETS.to_vec()
        };
        ratio_presets.retain(|p| p.is_finite() && *p > 0.0);
        ratio_presets.sort_by(|a, b| a.total_cmp(b));
        ratio_presets.dedup();

        info!(
            "Knowledge base loaded: {} chemicals, {} advisory rules, {} presets.",
            chemicals.len(),
            advisory_rules.len(),
            ratio_presets.len()
        );
        Ok(Self {
            chemicals,
            advisory_rules,
            ratio_presets,
        })
    }

    pub fn advisory_table(&self) -> AdvisoryTable {
        AdvisoryTable::new(self.advisory_rules.clone())
    }

    /// Chemicals matching `query`, sorted by name.
    pub fn search_chemicals(&self, query: &str) -> Vec<&Chemical> {
        let mut found: Vec<&Chemical> = self.chemicals.values().filter(|c| c.matches(query)).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}

/// YAML files in a directory, sorted by file name so load order is stable.
fn yaml_files(dir_path: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path)
        .with_context(|| format!("Failed to read directory: {:?}", dir_path))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |s| s == "yaml" || s == "yml") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn parse_yaml_file<F>(path: &Path) -> Result<F>
where
    F: for<'de> serde::Deserialize<'de>,
{
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML from {:?}", path))
}

/// Generic helper to load all YAML files in a directory into a HashMap.
fn load_yaml_files_into_map<F, E, T, K>(
    dir_path: &Path,
    extract_vec: E,
    get_key: K,
) -> Result<HashMap<String, T>>
where
    F: for<'de> serde::Deserialize<'de>, // The file wrapper struct (e.g., ChemicalFile)
    E: Fn(F) -> Vec<T>,                  // A closure to extract the Vec<T> from the wrapper
    K: Fn(&T) -> String,                 // A closure to get the key for the map from an item T
{
    let mut map = HashMap::new();
    for path in yaml_files(dir_path)? {
        for item in extract_vec(parse_yaml_file(&path)?) {
            map.insert(get_key(&item), item);
        }
    }
    Ok(map)
}

/// Like `load_yaml_files_into_map`, but keeps file-then-entry order; rule tables depend on it.
fn load_yaml_files_in_order<F, E, T>(dir_path: &Path, extract_vec: E) -> Result<Vec<T>>
where
    F: for<'de> serde::Deserialize<'de>,
    E: Fn(F) -> Vec<T>,
{
    let mut items = Vec::new();
    for path in yaml_files(dir_path)? {
        items.extend(extract_vec(parse_yaml_file(&path)?));
    }
    Ok(items)
}

fn builtin_chemicals() -> Vec<Chemical> {
    vec![
        Chemical {
            external_id: "chem-001".to_string(),
            name: "Sodium Hypochlorite (Bleach)".to_string(),
            short_description: "Chlorine-based oxidizing bleach used for whitening and disinfection.".to_string(),
            uses: "Mildew/mold removal, sanitizing siding, decks, concrete; organic stain removal.".to_string(),
            precautions: "Corrosive to skin/eyes; produces toxic gases if mixed with acids or ammonia; wear gloves, goggles, and respirator for fumes; control runoff.".to_string(),
            mixing_note: "Typically diluted for surface cleaning; follow product label for concentration.".to_string(),
            sds_url: None,
            brands: vec!["Clorox".to_string(), "Private Label Bleach".to_string()],
        },
        Chemical {
            external_id: "chem-002".to_string(),
            name: "Sodium Percarbonate (Oxygen Bleach)".to_string(),
            short_description: "Oxygen-based powdered bleach that releases hydrogen peroxide.".to_string(),
            uses: "Brightening wood and concrete; gentler mold/algae removal alternative to chlorine.".to_string(),
            precautions: "Oxidizer; eye/skin irritant; keep dry in storage; use gloves and goggles.".to_string(),
            mixing_note: "Dissolve per manufacturer's instructions; active at warm temperatures.".to_string(),
            sds_url: None,
            brands: vec!["OxiClean".to_string(), "Private Label Oxygen Bleach".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_falls_back_to_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::load(dir.path()).unwrap();
        assert_eq!(kb.chemicals.len(), 2);
        assert_eq!(kb.ratio_presets, STANDARD_RATIO_PRESETS.to_vec());
        assert_eq!(kb.advisory_rules, AdvisoryTable::standard().rules().to_vec());
    }

    #[test]
    fn rule_files_load_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("2_advisory_rules");
        fs::create_dir_all(&rules).unwrap();
        fs::write(
            rules.join("b.yaml"),
            "schema_version: \"1.0\"\nrules:\n  - name: second\n    condition: { type: wind, operator: at_least, mph: 5 }\n    status: suboptimal\n    message: later\n",
        )
        .unwrap();
        fs::write(
            rules.join("a.yaml"),
            "schema_version: \"1.0\"\nrules:\n  - name: first\n    category: roof\n    condition: { type: temperature, operator: at_least, fahrenheit: 90 }\n    status: dangerous\n    message: hot\n",
        )
        .unwrap();

        let kb = KnowledgeBase::load(dir.path()).unwrap();
        let names: Vec<&str> = kb.advisory_rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn presets_are_cleaned_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let presets = dir.path().join("3_presets");
        fs::create_dir_all(&presets).unwrap();
        fs::write(
            presets.join("valves.yaml"),
            "schema_version: \"1.0\"\nratio_presets: [64, 16, -1, 16, 32]\n",
        )
        .unwrap();

        let kb = KnowledgeBase::load(dir.path()).unwrap();
        assert_eq!(kb.ratio_presets, vec![16.0, 32.0, 64.0]);
    }

    #[test]
    fn shipped_knowledge_base_matches_builtins() {
        let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("../data/knowledge_base");
        let kb = KnowledgeBase::load(&base).unwrap();
        assert_eq!(kb.advisory_rules, AdvisoryTable::standard().rules().to_vec());
        assert_eq!(kb.ratio_presets, STANDARD_RATIO_PRESETS.to_vec());
        for builtin in builtin_chemicals() {
            assert_eq!(kb.chemicals.get(&builtin.external_id), Some(&builtin));
        }
    }

    #[test]
    fn chemical_search_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::load(dir.path()).unwrap();
        let hits = kb.search_chemicals("oxiclean");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].external_id, "chem-002");
        assert_eq!(kb.search_chemicals("").len(), 2);
    }
}
