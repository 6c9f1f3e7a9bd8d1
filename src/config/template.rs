use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::DeviceConfig;
use crate::EntryKind;
use crate::ObjectConfig;
use crate::SetupError;

/// A named group of object entries shared between devices via `reuse`
/// placeholders.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TemplateConfig {
    pub name: String,

    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

/// Replaces every `reuse` entry of `device` with the referenced
/// template's objects. Templates may reference other templates; expansion
/// repeats until no placeholder is left, bounded at 32 passes. Afterwards
/// unset intervals fall back to the device interval and object names are
/// checked for duplicates.
pub(crate) fn expand_templates(
    templates: &[TemplateConfig],
    device: &mut DeviceConfig,
) -> Result<(), SetupError> {
    let mut passes = 0;
    while device
        .objects
        .iter()
        .any(|entry| entry.kind == EntryKind::Reuse)
    {
        passes += 1;
        if passes > 32 {
            return Err(SetupError::TemplateRecursion(device.name.clone()));
        }

        let mut expanded = Vec::with_capacity(device.objects.len());
        for entry in std::mem::take(&mut device.objects) {
            if entry.kind != EntryKind::Reuse {
                expanded.push(entry);
                continue;
            }

            let template = templates
                .iter()
                .find(|template| template.name == entry.name)
                .ok_or_else(|| SetupError::MissingTemplate {
                    device: device.name.clone(),
                    template: entry.name.clone(),
                })?;

            for mut copy in template.objects.iter().cloned() {
                if entry.interval.is_some() {
                    copy.interval = entry.interval;
                }
                if entry.prefix {
                    copy.name = format!("{}_{}", template.name, copy.name);
                }
                expanded.push(copy);
            }
        }
        device.objects = expanded;
    }

    for entry in &mut device.objects {
        if entry.interval.is_none() {
            entry.interval = Some(device.interval);
        }
    }

    let mut names = BTreeSet::new();
    for entry in &device.objects {
        if !names.insert(entry.name.as_str()) {
            return Err(SetupError::DuplicateObject {
                device: device.name.clone(),
                object: entry.name.clone(),
            });
        }
    }

    Ok(())
}
