use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;
use tracing::warn;

use crate::constants::TABLE_COLUMN_SEPARATOR;
use crate::constants::TABLE_ROW_SEPARATOR;
use crate::object::AttributeEvent;
use crate::object::Subscribers;
use crate::utils::csv::CsvGrid;
use crate::AccessFlags;
use crate::Attribute;
use crate::ContentMirror;
use crate::DeviceClient;
use crate::MibResolver;
use crate::NamespaceError;
use crate::ObjectValue;
use crate::Oid;

/// One table column: filesystem-facing name plus the identifier prefix
/// all of its cells share.
pub struct TableColumn {
    name: String,
    id: Oid,
    access: AccessFlags,
}

/// A grouped set of attributes addressed by (column, row) below a shared
/// identifier prefix.
///
/// Columns are fixed at construction and never re-discovered; rows come
/// and go as polling observes new or vanished row keys. The file
/// representation is column-delimited, row-delimited text with a header
/// line.
pub struct Table {
    id: Oid,
    columns: Vec<TableColumn>,
    cells: Mutex<BTreeMap<Oid, BTreeMap<String, Arc<Attribute>>>>,
    subscribers: Subscribers,
    resolver: Arc<dyn MibResolver>,
}

impl Table {
    pub fn new(id: Oid, columns: Vec<(String, Oid)>, resolver: Arc<dyn MibResolver>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(name, column_id)| {
                let access = AccessFlags::from_access(
                    resolver.resolve(&column_id).map(|node| node.access),
                );
                TableColumn {
                    name,
                    id: column_id,
                    access,
                }
            })
            .collect();

        Table {
            id,
            columns,
            cells: Mutex::new(BTreeMap::new()),
            subscribers: Subscribers::default(),
            resolver,
        }
    }

    pub fn id(&self) -> &Oid {
        &self.id
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_id(&self, name: &str) -> Option<&Oid> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| &column.id)
    }

    /// A table is readable/writable when any of its columns is.
    pub fn is_readable(&self) -> bool {
        self.columns.iter().any(|column| column.access.readable())
    }

    pub fn is_writable(&self) -> bool {
        self.columns.iter().any(|column| column.access.writable())
    }

    pub fn subscribe(&self, sink: Arc<ContentMirror>) {
        self.subscribers.add(sink);
    }

    pub fn notify_changed(&self, restore: bool) {
        let data = self.render();
        self.subscribers.notify(AttributeEvent::Changed {
            data: &data,
            restore,
        });
    }

    pub fn notify_updated(&self) {
        self.subscribers.notify(AttributeEvent::Updated);
    }

    /// Row keys currently known, in their file ordering.
    pub fn row_keys(&self) -> BTreeSet<String> {
        let cells = self.cells.lock();
        let mut keys = BTreeSet::new();
        for column_cells in cells.values() {
            keys.extend(column_cells.keys().cloned());
        }
        keys
    }

    /// Current content as header line plus one line per row; cells a
    /// column never reported render empty.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&names.join(&TABLE_COLUMN_SEPARATOR.to_string()));
        out.push(TABLE_ROW_SEPARATOR);

        let cells = self.cells.lock();
        let keys = {
            let mut keys = BTreeSet::new();
            for column_cells in cells.values() {
                keys.extend(column_cells.keys().cloned());
            }
            keys
        };

        let mut first = true;
        for key in &keys {
            if !first {
                out.push(TABLE_ROW_SEPARATOR);
            }
            first = false;

            for (index, column) in self.columns.iter().enumerate() {
                if index > 0 {
                    out.push(TABLE_COLUMN_SEPARATOR);
                }
                if let Some(cell) = cells.get(&column.id).and_then(|col| col.get(key)) {
                    let _ = write!(out, "{}", cell.data());
                }
            }
        }

        out
    }

    /// remote -> local: walks every column's subtree, creating cells for
    /// new row keys, updating existing ones and dropping rows that the
    /// latest walk no longer reported.
    pub async fn refresh(&self, client: &DeviceClient) -> bool {
        if self.columns.is_empty() {
            return false;
        }

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut changed = false;

        for column in &self.columns {
            let values = client.walk_subtree(&column.id).await;

            let mut cells = self.cells.lock();
            let column_cells = cells.entry(column.id.clone()).or_default();
            for value in values {
                let Some(row_key) = row_key_of(&column.id, &value.id) else {
                    continue;
                };
                seen.insert(row_key.clone());

                let cell = column_cells.entry(row_key).or_insert_with(|| {
                    Arc::new(Attribute::new(
                        value.id.clone(),
                        value.value_type,
                        self.resolver.as_ref(),
                    ))
                });
                changed |= cell.absorb(&value);
            }
        }

        {
            let mut cells = self.cells.lock();
            for column_cells in cells.values_mut() {
                let stale: Vec<String> = column_cells
                    .keys()
                    .filter(|key| !seen.contains(*key))
                    .cloned()
                    .collect();
                for key in stale {
                    column_cells.remove(&key);
                    changed = true;
                }
            }
        }

        if changed {
            self.notify_changed(false);
        }
        self.notify_updated();
        true
    }

    /// local -> remote: parses delimited text, maps header names to
    /// columns and row positions to the current row-key order, then
    /// commits every cell. A malformed layout aborts the whole commit and
    /// restores all subscribers; it never partially commits.
    pub async fn commit(&self, client: &DeviceClient, text: &str) -> bool {
        let plan = match self.prepare_commit(text) {
            Ok(plan) => plan,
            Err(layout_error) => {
                error!(device = client.name(), oid = %self.id, %layout_error, "can't update table");
                self.notify_changed(true);
                return false;
            }
        };

        let mut all_success = true;
        for (cell, data) in plan {
            all_success &= cell.commit(client, &data).await;
        }

        // The mirror content was speculatively edited by the writer and
        // has to be rebuilt even when nothing changed remotely.
        self.notify_changed(false);
        all_success
    }

    /// Resolves the textual layout against known columns and rows without
    /// touching the device.
    fn prepare_commit(
        &self,
        text: &str,
    ) -> Result<Vec<(Arc<Attribute>, String)>, NamespaceError> {
        let grid = CsvGrid::parse(text, TABLE_COLUMN_SEPARATOR, TABLE_ROW_SEPARATOR)?;
        if grid.is_empty() {
            return Err(NamespaceError::TableLayout("missing header row".to_string()));
        }

        let header = grid.row(0).expect("grid is not empty");
        let mut column_ids = Vec::with_capacity(header.len());
        for name in header {
            let id = self.column_id(name).ok_or_else(|| {
                NamespaceError::TableLayout(format!("no column found for '{name}'"))
            })?;
            column_ids.push(id.clone());
        }

        let keys: Vec<String> = self.row_keys().into_iter().collect();
        if grid.row_count() - 1 != keys.len() {
            return Err(NamespaceError::TableLayout(format!(
                "{} data rows for {} known rows",
                grid.row_count() - 1,
                keys.len()
            )));
        }

        let cells = self.cells.lock();
        let mut plan = Vec::new();
        for row in 1..grid.row_count() {
            let row_key = &keys[row - 1];
            for (column_index, column_id) in column_ids.iter().enumerate() {
                let cell_data = grid
                    .get(row, column_index)
                    .expect("grid rows have equal lengths");
                let cell = cells
                    .get(column_id)
                    .and_then(|column_cells| column_cells.get(row_key))
                    .ok_or_else(|| {
                        NamespaceError::TableLayout(format!(
                            "no cell for column {column_id} row {row_key}"
                        ))
                    })?;
                plan.push((cell.clone(), cell_data.to_string()));
            }
        }

        Ok(plan)
    }

    /// Routes a confirmed cell value (trap delivery) to its cell.
    pub fn absorb(&self, value: &ObjectValue) -> bool {
        let cells = self.cells.lock();
        for (column_id, column_cells) in cells.iter() {
            if !column_id.is_ancestor_of(&value.id) {
                continue;
            }
            if let Some(row_key) = row_key_of(column_id, &value.id) {
                if let Some(cell) = column_cells.get(&row_key) {
                    return cell.absorb(value);
                }
            }
        }

        warn!(oid = %value.id, table = %self.id, "no cell found for value");
        false
    }
}

/// Row key of a cell: the dotted identifier suffix past its column.
fn row_key_of(column: &Oid, cell: &Oid) -> Option<String> {
    let suffix = cell.strip_prefix(column)?;
    if suffix.is_empty() {
        return None;
    }
    let mut key = String::new();
    for part in suffix {
        let _ = write!(key, ".{}", part);
    }
    Some(key)
}
