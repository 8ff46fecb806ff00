//! Code for reading models in the COBRA JSON format (as distributed by BiGG).
use super::input_err_msg;
use crate::metabolite::{Metabolite, MetaboliteID};
use crate::model::Model;
use crate::reaction::Reaction;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// The top-level object of a COBRA JSON model
#[derive(Deserialize)]
struct JsonModel {
    id: Option<String>,
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    #[serde(default)]
    genes: Vec<Value>,
    #[serde(default)]
    compartments: IndexMap<String, String>,
    version: Option<Value>,
}

#[derive(Deserialize)]
struct JsonMetabolite {
    id: String,
    compartment: Option<String>,
}

#[derive(Deserialize)]
struct JsonReaction {
    id: String,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    objective_coefficient: Option<f64>,
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id.into(),
            compartment: m.compartment,
        }
    }
}

impl From<JsonReaction> for Reaction {
    fn from(r: JsonReaction) -> Self {
        Self {
            id: r.id.into(),
            metabolites: r
                .metabolites
                .into_iter()
                .map(|(id, coeff)| (MetaboliteID::from(id), coeff))
                .collect(),
            lower_bound: r.lower_bound,
            upper_bound: r.upper_bound,
            objective_coefficient: r.objective_coefficient.unwrap_or_default(),
        }
    }
}

/// Read a model from a COBRA JSON file.
///
/// If the file does not give a model ID, the name of the file's parent folder is used.
pub fn read_cobra_json(file_path: &Path) -> Result<Model> {
    let json_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let json_model: JsonModel =
        serde_json::from_str(&json_str).with_context(|| input_err_msg(file_path))?;
    let default_id = file_path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    from_json_model(json_model, default_id).with_context(|| input_err_msg(file_path))
}

fn from_json_model(json_model: JsonModel, default_id: String) -> Result<Model> {
    let mut metabolites = IndexMap::new();
    for metabolite in json_model.metabolites.into_iter().map(Metabolite::from) {
        if let Some(compartment) = &metabolite.compartment {
            ensure!(
                json_model.compartments.is_empty()
                    || json_model.compartments.contains_key(compartment),
                "Metabolite {} is in unknown compartment {compartment}",
                metabolite.id
            );
        }

        let id = metabolite.id.clone();
        ensure!(
            metabolites.insert(id.clone(), metabolite).is_none(),
            "Duplicate metabolite ID {id}"
        );
    }

    let mut reactions = IndexMap::new();
    for reaction in json_model.reactions.into_iter().map(Reaction::from) {
        let id = reaction.id.clone();
        ensure!(
            reactions.insert(id.clone(), reaction).is_none(),
            "Duplicate reaction ID {id}"
        );
    }

    let model = Model::new(
        json_model.id.unwrap_or(default_id),
        reactions,
        metabolites,
    );
    model.validate()?;

    let version = match json_model.version {
        Some(Value::String(version)) => version,
        Some(version) => version.to_string(),
        None => "unknown".to_string(),
    };
    debug!(
        "Read model {} (version {version}) with {} reactions, {} metabolites and {} genes",
        model.id,
        model.reactions.len(),
        model.metabolites.len(),
        json_model.genes.len()
    );

    Ok(model)
}
