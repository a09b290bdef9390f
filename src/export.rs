//! Virtual-tabletop export documents.
//!
//! Maps extracted records onto the actor/item document shapes the importer
//! consumes, prunes empty fields from the serialized tree, deduplicates by
//! name, and writes one YAML file per monster. Identifiers are derived from
//! the record name, so identical input always yields identical output.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::model::{Ability, Monster};

/// Length of the derived identifier, in hex characters.
const ID_LEN: usize = 16;

/// Derive a stable identifier from a record name.
pub fn derived_id(name: &str) -> String {
    let digest = Sha256::digest(name.to_lowercase().as_bytes());
    hex::encode(digest)[..ID_LEN].to_string()
}

/// Token width from a size token: "2" or "2L" occupy two squares, size-1
/// variants ("1S", "1M", "1L") and anything unreadable occupy one.
fn token_width(size: &str) -> u32 {
    size.chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|&w| w >= 1)
        .unwrap_or(1)
}

/// Build the item document for one ability.
pub fn item_document(ability: &Ability) -> Value {
    let item_id = derived_id(&format!("{}/{}", ability.header_raw, ability.name));
    let mut doc = json!({
        "_id": item_id,
        "_key": format!("!items!{item_id}"),
        "name": ability.name,
        "type": "monsterAbility",
        "img": "icons/svg/book.svg",
        "system": {
            "type": ability.kind,
            "keywords": ability.keywords,
            "villainActionOrdinal": ability.villain_action_ordinal,
            "maliceCost": ability.malice_cost,
            "distance": ability.distance,
            "target": ability.target,
            "powerRoll": ability.power_roll,
            "trigger": ability.trigger,
            "prePowerRollEffect": ability.pre_power_roll_effect,
            "maliceEffect": ability.malice_effect,
            "postPowerRollEffect": ability.post_power_roll_effect,
        },
    });
    prune_nulls(&mut doc);
    doc
}

/// Build the actor document for one monster.
pub fn actor_document(monster: &Monster) -> Value {
    let actor_id = derived_id(&monster.name);
    let is_minion = monster.is_minion();
    let width = token_width(&monster.size);

    let stamina = if is_minion {
        json!({
            "max": monster.stamina,
            "perMinion": monster.stamina,
            "value": monster.stamina,
        })
    } else {
        json!({ "max": monster.stamina, "value": monster.stamina })
    };

    let items: Vec<Value> = monster.abilities.iter().map(item_document).collect();

    let mut doc = json!({
        "_id": actor_id,
        "_key": format!("!actors!{actor_id}"),
        "name": monster.name,
        "type": if is_minion { "minion" } else { "enemy" },
        "img": "icons/svg/mystery-man.svg",
        "prototypeToken": {
            "name": monster.name,
            "displayName": 50,
            "displayBars": 50,
            "bar1": { "attribute": "stamina" },
            "disposition": -1,
            "actorLink": false,
            "width": width,
            "height": width,
            "lockRotation": true,
            "texture": { "img": "icons/svg/mystery-man.svg" },
        },
        "system": {
            "name": monster.name,
            "keywords": monster.keywords,
            "level": monster.level,
            "type": monster.organization.as_str(),
            "role": monster.role.map(|r| r.as_str()).unwrap_or(""),
            "encounterValue": monster.encounter_value,
            "characteristics": monster.characteristics,
            "stamina": stamina,
            "combat": {
                "size": monster.size,
                "speed": monster.speed,
                "movementTypes": monster.movement_types,
                "stability": monster.stability,
                "freeStrikeDamage": monster.free_strike_damage,
            },
            "immunity": monster.immunity,
            "weakness": monster.weakness,
            "withCaptain": monster.with_captain,
        },
        "items": items,
    });
    prune_nulls(&mut doc);
    doc
}

/// Remove nulls and empty maps so optional fields vanish from output.
fn prune_nulls(value: &mut Value) {
    if let Value::Object(map) = value {
        let keys: Vec<String> = map.keys().cloned().collect();
        for key in keys {
            let child = map.get_mut(&key).expect("key just listed");
            prune_nulls(child);
            let drop = match child {
                Value::Null => true,
                Value::Object(inner) => inner.is_empty(),
                _ => false,
            };
            if drop {
                map.remove(&key);
            }
        }
    } else if let Value::Array(items) = value {
        for item in items {
            prune_nulls(item);
        }
    }
}

/// Drop later documents whose name repeats an earlier one.
pub fn dedup_by_name(documents: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    documents
        .into_iter()
        .filter(|doc| {
            let name = doc["name"].as_str().unwrap_or_default().to_lowercase();
            seen.insert(name)
        })
        .collect()
}

/// File name for one actor document: kebab-cased name plus extension.
pub fn export_file_name(doc: &Value) -> String {
    let name = doc["name"].as_str().unwrap_or("unnamed").to_lowercase();
    format!("{}.yml", name.replace(' ', "-"))
}

/// Write one YAML file per actor document into `dir`.
pub fn write_yaml(dir: &Path, documents: &[Value]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    for doc in documents {
        let yaml = serde_yaml::to_string(doc)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(dir.join(export_file_name(doc)), yaml)?;
    }
    Ok(())
}

/// Build, deduplicate, and order the actor documents for a run.
pub fn actor_documents(monsters: &[Monster]) -> Vec<Value> {
    dedup_by_name(monsters.iter().map(actor_document).collect())
}

// ============================================================================
// Tests
// ============================================================================
