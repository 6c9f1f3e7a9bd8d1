use crate::config::config_test::device;
use crate::config::config_test::object;
use crate::config::expand_templates;
use crate::EntryKind;
use crate::ObjectConfig;
use crate::SetupError;
use crate::TemplateConfig;

fn reuse(template: &str) -> ObjectConfig {
    let mut entry = object(template, "", EntryKind::Reuse);
    entry.kind = EntryKind::Reuse;
    entry
}

fn system_template() -> TemplateConfig {
    TemplateConfig {
        name: "system".to_string(),
        objects: vec![
            object("hostname", ".1.3.6.1.2.1.1.5.0", EntryKind::Scalar),
            object("contact", ".1.3.6.1.2.1.1.4.0", EntryKind::Scalar),
        ],
    }
}

#[test]
fn test_reuse_is_replaced_by_template_objects() {
    let templates = vec![system_template()];
    let mut dev = device("dev0", vec![reuse("system")]);

    expand_templates(&templates, &mut dev).expect("should expand");

    assert_eq!(dev.objects.len(), 2);
    assert_eq!(dev.objects[0].name, "hostname");
    assert_eq!(dev.objects[1].name, "contact");
    // Unset intervals fall back to the device interval
    assert_eq!(dev.objects[0].interval, Some(5));
}

#[test]
fn test_reuse_interval_overrides_template() {
    let templates = vec![system_template()];
    let mut entry = reuse("system");
    entry.interval = Some(120);
    let mut dev = device("dev0", vec![entry]);

    expand_templates(&templates, &mut dev).expect("should expand");

    assert_eq!(dev.objects[0].interval, Some(120));
    assert_eq!(dev.objects[1].interval, Some(120));
}

#[test]
fn test_reuse_prefix_renames_objects() {
    let templates = vec![system_template()];
    let mut entry = reuse("system");
    entry.prefix = true;
    let mut dev = device("dev0", vec![entry]);

    expand_templates(&templates, &mut dev).expect("should expand");

    assert_eq!(dev.objects[0].name, "system_hostname");
    assert_eq!(dev.objects[1].name, "system_contact");
}

#[test]
fn test_nested_templates_expand() {
    let inner = system_template();
    let outer = TemplateConfig {
        name: "host".to_string(),
        objects: vec![
            reuse("system"),
            object("uptime", ".1.3.6.1.2.1.25.1.1.0", EntryKind::Scalar),
        ],
    };

    let mut dev = device("dev0", vec![reuse("host")]);
    expand_templates(&[inner, outer], &mut dev).expect("should expand");

    let names: Vec<&str> = dev.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["hostname", "contact", "uptime"]);
}

#[test]
fn test_missing_template_is_fatal() {
    let mut dev = device("dev0", vec![reuse("nope")]);
    let result = expand_templates(&[], &mut dev);

    assert!(matches!(
        result,
        Err(SetupError::MissingTemplate { .. })
    ));
}

#[test]
fn test_self_referencing_template_is_bounded() {
    let recursive = TemplateConfig {
        name: "loop".to_string(),
        objects: vec![reuse("loop")],
    };

    let mut dev = device("dev0", vec![reuse("loop")]);
    let result = expand_templates(&[recursive], &mut dev);

    assert!(matches!(result, Err(SetupError::TemplateRecursion(_))));
}

#[test]
fn test_duplicate_names_after_expansion_are_fatal() {
    let templates = vec![system_template()];
    let mut dev = device(
        "dev0",
        vec![
            reuse("system"),
            object("hostname", ".1.3.6.1.2.1.1.5.0", EntryKind::Scalar),
        ],
    );

    let result = expand_templates(&templates, &mut dev);
    assert!(matches!(result, Err(SetupError::DuplicateObject { .. })));
}
