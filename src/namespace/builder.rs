use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;
use tracing::warn;

use crate::Attribute;
use crate::Device;
use crate::DiscoveryTree;
use crate::EntryKind;
use crate::MibNode;
use crate::MibResolver;
use crate::Node;
use crate::ObjectConfig;
use crate::Oid;
use crate::Result;
use crate::Scheduler;
use crate::SyncedObject;
use crate::Table;
use crate::ValueType;

/// Everything the namespace construction of one device needs: the
/// discovery cache, the device registry, the scheduler receiving polling
/// tasks and the schema resolver.
pub struct BuildContext<'a> {
    pub tree: &'a DiscoveryTree,
    pub device: &'a Arc<Device>,
    pub scheduler: &'a Scheduler,
    pub resolver: &'a Arc<dyn MibResolver>,
}

fn child_entry(name: String, oid: &Oid, kind: EntryKind, interval: Option<u64>) -> ObjectConfig {
    ObjectConfig {
        name,
        oid: oid.to_string(),
        kind,
        interval,
        columns: Vec::new(),
        placeholder: false,
        prefix: false,
    }
}

/// Materializes one configuration entry below `parent`: scalar and table
/// entries become bound leaf nodes, subtree entries expand recursively
/// from schema or discovery data.
pub fn create_nodes<'a>(
    ctx: &'a BuildContext<'a>,
    parent: Arc<Node>,
    entry: ObjectConfig,
) -> BoxFuture<'a, Result<()>> {
    async move {
        let id = entry.parsed_oid()?;
        match entry.kind {
            EntryKind::Scalar | EntryKind::Table => create_leaf(ctx, parent, entry, id).await,
            EntryKind::Subtree => create_tree(ctx, parent, entry, id).await,
            // Replaced by template content during configuration resolution
            EntryKind::Reuse => Ok(()),
        }
    }
    .boxed()
}

async fn create_leaf(
    ctx: &BuildContext<'_>,
    parent: Arc<Node>,
    entry: ObjectConfig,
    id: Oid,
) -> Result<()> {
    let interval = entry.interval.unwrap_or(ctx.device.config().interval);

    // A scalar the device never revealed does not exist here; skip the
    // entry without failing the device.
    let discovered = ctx.tree.get(&id);
    if entry.kind == EntryKind::Scalar && discovered.is_none() {
        debug!(device = ctx.device.name(), oid = %id, "scalar not present on device");
        return Ok(());
    }

    let object = match ctx.device.lookup(&id, interval) {
        Some(existing) => existing,
        None => {
            let object = match entry.kind {
                EntryKind::Scalar => {
                    let attribute = match discovered.and_then(|node| ctx.tree.value(node)) {
                        Some(value) => Attribute::seeded(value, ctx.resolver.as_ref()),
                        None => Attribute::new(
                            id.clone(),
                            ValueType::default(),
                            ctx.resolver.as_ref(),
                        ),
                    };
                    SyncedObject::Scalar(Arc::new(attribute))
                }
                _ => {
                    let table = build_table(ctx, &id, &entry)?;
                    let object = SyncedObject::Table(Arc::new(table));
                    object.refresh(ctx.device.client()).await;
                    object
                }
            };
            ctx.device.register(object.clone(), interval, ctx.scheduler);
            object
        }
    };

    let node = Node::file(&entry.name, object.clone(), ctx.device.client().clone());
    parent.add_child(node)?;

    // Prime the fresh mirror with the current confirmed content
    object.notify_changed(false);
    object.notify_updated();
    Ok(())
}

/// Column resolution priority: explicit configuration, then schema
/// children, then a discovery-tree walk.
fn build_table(ctx: &BuildContext<'_>, id: &Oid, entry: &ObjectConfig) -> Result<Table> {
    let mut columns: Vec<(String, Oid)> = Vec::new();

    if !entry.columns.is_empty() {
        for column in &entry.columns {
            columns.push((column.name.clone(), column.oid.parse()?));
        }
    } else if let Some(mib) = ctx.resolver.resolve(id) {
        columns = columns_from_schema(id, &mib);
        if columns.is_empty() {
            warn!(device = ctx.device.name(), oid = %id, "schema has no columns for table");
        }
    } else {
        columns = columns_from_discovery(ctx, id, entry);
    }

    Ok(Table::new(id.clone(), columns, ctx.resolver.clone()))
}

/// A table's schema node carries one entry node, whose children are the
/// columns.
fn columns_from_schema(id: &Oid, mib: &MibNode) -> Vec<(String, Oid)> {
    let Some(entry_node) = mib.children.first() else {
        return Vec::new();
    };

    entry_node
        .children
        .iter()
        .map(|column| {
            (
                column.label.clone(),
                id.child(entry_node.sub_id).child(column.sub_id),
            )
        })
        .collect()
}

fn columns_from_discovery(
    ctx: &BuildContext<'_>,
    id: &Oid,
    entry: &ObjectConfig,
) -> Vec<(String, Oid)> {
    let Some(table_node) = ctx.tree.get(id) else {
        warn!(device = ctx.device.name(), object = %entry.name, "no table in discovery data");
        return Vec::new();
    };
    let Some(entry_node) = ctx.tree.child_by_component(table_node, 1) else {
        warn!(device = ctx.device.name(), object = %entry.name, "no entry in discovery data");
        return Vec::new();
    };

    ctx.tree
        .child_oids(entry_node)
        .into_iter()
        .map(|column| (column.to_string(), column))
        .collect()
}

async fn create_tree(
    ctx: &BuildContext<'_>,
    parent: Arc<Node>,
    entry: ObjectConfig,
    id: Oid,
) -> Result<()> {
    match ctx.resolver.resolve(&id) {
        Some(mib) => expand_from_schema(ctx, parent, entry, id, mib).await,
        None => expand_from_discovery(ctx, parent, entry, id).await,
    }
}

async fn expand_from_schema(
    ctx: &BuildContext<'_>,
    parent: Arc<Node>,
    entry: ObjectConfig,
    id: Oid,
    mib: Arc<MibNode>,
) -> Result<()> {
    if mib.is_table() {
        let table_entry = child_entry(entry.name, &id, EntryKind::Table, entry.interval);
        return create_nodes(ctx, parent, table_entry).await;
    }

    if !mib.children.is_empty() {
        let node = if entry.placeholder {
            parent.clone()
        } else {
            Node::directory(&entry.name)
        };

        for child in &mib.children {
            let child_id = id.child(child.sub_id);
            let child_config = child_entry(
                child.label.clone(),
                &child_id,
                EntryKind::Subtree,
                entry.interval,
            );
            create_nodes(ctx, node.clone(), child_config).await?;
        }

        // Avoid loads of empty directories
        if !entry.placeholder && node.child_count() > 0 {
            parent.add_child(node)?;
        }
        return Ok(());
    }

    // Schema leaf: the value lives at instance 0
    let scalar_id = id.child(0);
    let scalar_entry = child_entry(entry.name, &scalar_id, EntryKind::Scalar, entry.interval);
    create_nodes(ctx, parent, scalar_entry).await
}

async fn expand_from_discovery(
    ctx: &BuildContext<'_>,
    parent: Arc<Node>,
    entry: ObjectConfig,
    id: Oid,
) -> Result<()> {
    let Some(sub_tree) = ctx.tree.get(&id) else {
        return Ok(());
    };

    let children = ctx.tree.children(sub_tree);
    let lone_instance = children.len() == 1
        && ctx.tree.oid(children[0]).back() == Some(0)
        && ctx.tree.children(children[0]).is_empty();

    if lone_instance {
        let scalar_id = ctx.tree.oid(children[0]).clone();
        let scalar_entry = child_entry(entry.name, &scalar_id, EntryKind::Scalar, entry.interval);
        return create_nodes(ctx, parent, scalar_entry).await;
    }

    // Without schema there is no table detection; everything else becomes
    // a directory over the discovered children.
    let node = if entry.placeholder {
        parent.clone()
    } else {
        Node::directory(&entry.name)
    };

    for child_id in ctx.tree.child_oids(sub_tree) {
        let name = child_id
            .back()
            .map(|component| component.to_string())
            .unwrap_or_default();
        let child_config = child_entry(name, &child_id, EntryKind::Subtree, entry.interval);
        create_nodes(ctx, node.clone(), child_config).await?;
    }

    if !entry.placeholder && node.child_count() > 0 {
        parent.add_child(node)?;
    }
    Ok(())
}

/// Builds the device's directory (one per device, named after it) under
/// `root` from its configured entries.
pub async fn build_device_namespace(
    ctx: &BuildContext<'_>,
    root: &Arc<Node>,
) -> Result<Arc<Node>> {
    let device_node = Node::directory(ctx.device.name());

    for entry in ctx.device.config().objects.clone() {
        create_nodes(ctx, device_node.clone(), entry).await?;
    }

    root.add_child(device_node.clone())?;
    Ok(device_node)
}
