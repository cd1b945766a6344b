//! Class experience from a player profile document
//!
//! The document is the JSON served by the public dungeon stats API, already
//! downloaded by the caller:
//!
//! ```text
//! { "profiles": { "<id>": { "dungeons": { "classes": { "classes": {
//!     "<class>": { "level": { "xp": 123.0, ... }, ... } } } } } } }
//! ```
//!
//! A player may have several profiles; the highest experience found for a
//! class is kept. Classes with no numeric experience anywhere are left out.

use crate::error::Result;
use crate::types::ClassExperience;
use serde_json::Value;

/// Payload keys accepted for a class besides its own name
const CLASS_ALIASES: [(&str, &str); 1] = [("berserker", "berserk")];

fn key_matches(class: &str, key: &str) -> bool {
    if key.eq_ignore_ascii_case(class) {
        return true;
    }
    CLASS_ALIASES
        .iter()
        .any(|(name, alias)| class.eq_ignore_ascii_case(name) && key.eq_ignore_ascii_case(alias))
}

/// Configured class that a payload or command-line key refers to
///
/// Keys match class names without regard to ASCII case, and `berserk` is
/// accepted for `berserker`.
pub fn resolve_class<'a, S: AsRef<str>>(key: &str, classes: &'a [S]) -> Option<&'a str> {
    classes
        .iter()
        .map(|c| c.as_ref())
        .find(|c| key_matches(c, key))
}

/// The `classes` object of one profile, if the profile has one
fn profile_classes<'a>(id: &str, profile: &'a Value) -> Option<&'a serde_json::Map<String, Value>> {
    let classes = profile
        .get("dungeons")
        .and_then(|d| d.get("classes"))
        .and_then(|c| c.get("classes"))
        .and_then(|c| c.as_object());
    if classes.is_none() {
        log::warn!("Profile {} has no dungeon class data", id);
    }
    classes
}

/// Highest experience per requested class across all profiles
///
/// The result follows the order of `classes`.
pub fn extract_class_experience<S: AsRef<str>>(payload: &Value, classes: &[S]) -> ClassExperience {
    let mut best: Vec<Option<f64>> = vec![None; classes.len()];

    match payload.get("profiles").and_then(|p| p.as_object()) {
        Some(profiles) => {
            for (id, profile) in profiles {
                let Some(class_data) = profile_classes(id, profile) else {
                    continue;
                };
                for (key, info) in class_data {
                    let Some(slot) = classes.iter().position(|c| key_matches(c.as_ref(), key))
                    else {
                        continue;
                    };
                    let xp = info
                        .get("level")
                        .and_then(|l| l.get("xp"))
                        .and_then(|x| x.as_f64());
                    match xp {
                        Some(xp) => {
                            best[slot] = Some(best[slot].map_or(xp, |prev| prev.max(xp)));
                        }
                        None => log::warn!("Profile {}: class '{}' has no numeric xp", id, key),
                    }
                }
            }
        }
        None => log::warn!("Profile document has no 'profiles' object"),
    }

    classes
        .iter()
        .zip(best)
        .filter_map(|(class, xp)| {
            let class = class.as_ref();
            if xp.is_none() {
                log::warn!("No experience found for class '{}'", class);
            }
            xp.map(|xp| (class, xp))
        })
        .collect()
}

/// Parse a profile document and extract class experience
pub fn parse_profile<S: AsRef<str>>(json: &str, classes: &[S]) -> Result<ClassExperience> {
    let payload: Value = serde_json::from_str(json)?;
    Ok(extract_class_experience(&payload, classes))
}
