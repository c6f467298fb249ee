//! Schema descriptors for the imported catalog tables
//!
//! Every table the importer owns is described once here. DDL, insert
//! statements and the per-column null fallback are all derived from these
//! descriptors so the importer never hand-writes SQL per table.

use std::fmt;

/// SQLite storage class requested for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

/// One declared column of a dataset.
///
/// `default` is what gets stored when the CSV has no such column (or the
/// row is short); `None` means SQL NULL. A `required` column that is absent
/// from the CSV header fails the whole table load instead.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub required: bool,
    pub default: Option<&'static str>,
}

impl ColumnSpec {
    pub const fn text(name: &'static str) -> Self {
        Self::nullable(name, SqlType::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::nullable(name, SqlType::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::nullable(name, SqlType::Real)
    }

    const fn nullable(name: &'static str, sql_type: SqlType) -> Self {
        Self { name, sql_type, required: false, default: None }
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }

    pub const fn with_default(self, value: &'static str) -> Self {
        Self { default: Some(value), ..self }
    }
}

/// Destination tables written by the importer and served by the dump endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Orders,
    OrderItems,
    InventoryItems,
    DistributionCenters,
    Products,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Orders => "orders",
            Table::OrderItems => "order_items",
            Table::InventoryItems => "inventory_items",
            Table::DistributionCenters => "distribution_centers",
            Table::Products => "products",
        }
    }

    pub fn dataset(&self) -> &'static Dataset {
        match self {
            Table::Users => &DATASETS[0],
            Table::Orders => &DATASETS[1],
            Table::OrderItems => &DATASETS[2],
            Table::InventoryItems => &DATASETS[3],
            Table::DistributionCenters => &DATASETS[4],
            Table::Products => &DATASETS[5],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A CSV source file bound to its destination table
#[derive(Debug, Clone, Copy)]
pub struct Dataset {
    pub file_name: &'static str,
    pub table: Table,
    pub columns: &'static [ColumnSpec],
}

impl Dataset {
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.table.name())
    }

    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.sql_type.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({});", self.table.name(), columns)
    }

    pub fn insert_sql(&self) -> String {
        let names = self.columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.name(),
            names,
            placeholders
        )
    }
}

const USER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("id"),
    ColumnSpec::text("first_name"),
    ColumnSpec::text("last_name"),
    ColumnSpec::text("email"),
    ColumnSpec::integer("age"),
    ColumnSpec::text("gender"),
    ColumnSpec::text("state"),
    ColumnSpec::text("street_address"),
    ColumnSpec::text("postal_code"),
    ColumnSpec::text("city"),
    ColumnSpec::text("country"),
    ColumnSpec::real("latitude"),
    ColumnSpec::real("longitude"),
    ColumnSpec::text("traffic_source"),
    ColumnSpec::text("created_at"),
];

const ORDER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("order_id"),
    ColumnSpec::text("user_id"),
    ColumnSpec::text("status"),
    ColumnSpec::text("gender"),
    ColumnSpec::text("created_at"),
    ColumnSpec::text("returned_at"),
    ColumnSpec::text("shipped_at"),
    ColumnSpec::text("delivered_at"),
    ColumnSpec::integer("num_of_item"),
];

const ORDER_ITEM_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("id"),
    ColumnSpec::text("order_id"),
    ColumnSpec::text("user_id"),
    ColumnSpec::text("product_id"),
    ColumnSpec::text("inventory_item_id"),
    ColumnSpec::text("status"),
    ColumnSpec::text("created_at"),
    ColumnSpec::text("shipped_at"),
    ColumnSpec::text("delivered_at"),
    ColumnSpec::text("returned_at"),
    ColumnSpec::real("sale_price"),
];

const INVENTORY_ITEM_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("id"),
    ColumnSpec::text("product_id"),
    ColumnSpec::text("created_at"),
    ColumnSpec::text("sold_at"),
    ColumnSpec::real("cost"),
    ColumnSpec::text("product_category"),
    ColumnSpec::text("product_name"),
    ColumnSpec::text("product_brand"),
    ColumnSpec::real("product_retail_price"),
    ColumnSpec::text("product_department"),
    ColumnSpec::text("product_sku"),
    ColumnSpec::text("product_distribution_center_id"),
];

const DISTRIBUTION_CENTER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("id"),
    ColumnSpec::text("name"),
    ColumnSpec::real("latitude"),
    ColumnSpec::real("longitude"),
];

const PRODUCT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("id"),
    ColumnSpec::real("cost"),
    ColumnSpec::real("retail_price"),
    ColumnSpec::text("department"),
    ColumnSpec::text("sku"),
];

/// All datasets, in import order.
pub static DATASETS: [Dataset; 6] = [
    Dataset { file_name: "users.csv", table: Table::Users, columns: USER_COLUMNS },
    Dataset { file_name: "orders.csv", table: Table::Orders, columns: ORDER_COLUMNS },
    Dataset { file_name: "order_items.csv", table: Table::OrderItems, columns: ORDER_ITEM_COLUMNS },
    Dataset {
        file_name: "inventory_items.csv",
        table: Table::InventoryItems,
        columns: INVENTORY_ITEM_COLUMNS,
    },
    Dataset {
        file_name: "distribution_centers.csv",
        table: Table::DistributionCenters,
        columns: DISTRIBUTION_CENTER_COLUMNS,
    },
    Dataset { file_name: "products.csv", table: Table::Products, columns: PRODUCT_COLUMNS },
];

/// Drops and recreates every catalog table in one batch.
pub fn reset_sql() -> String {
    let mut sql = String::new();
    for dataset in DATASETS.iter() {
        sql.push_str(&dataset.drop_sql());
        sql.push('\n');
    }
    for dataset in DATASETS.iter() {
        sql.push_str(&dataset.create_sql());
        sql.push('\n');
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_ddl() {
        assert_eq!(
            Table::Products.dataset().create_sql(),
            "CREATE TABLE products (id TEXT, cost REAL, retail_price REAL, department TEXT, sku TEXT);"
        );
    }

    #[test]
    fn test_insert_uses_one_placeholder_per_column() {
        let sql = Table::DistributionCenters.dataset().insert_sql();
        assert_eq!(
            sql,
            "INSERT INTO distribution_centers (id, name, latitude, longitude) VALUES (?1, ?2, ?3, ?4)"
        );
    }

    #[test]
    fn test_dataset_lookup_matches_table() {
        for dataset in DATASETS.iter() {
            assert_eq!(dataset.table.dataset().file_name, dataset.file_name);
            assert_eq!(dataset.file_name, format!("{}.csv", dataset.table.name()));
        }
    }

    #[test]
    fn test_import_order_is_fixed() {
        let order: Vec<&str> = DATASETS.iter().map(|d| d.table.name()).collect();
        assert_eq!(
            order,
            vec![
                "users",
                "orders",
                "order_items",
                "inventory_items",
                "distribution_centers",
                "products"
            ]
        );
    }

    #[test]
    fn test_monetary_and_count_types() {
        let users = Table::Users.dataset();
        let age = users.columns.iter().find(|c| c.name == "age").unwrap();
        assert_eq!(age.sql_type, SqlType::Integer);

        let items = Table::OrderItems.dataset();
        let price = items.columns.iter().find(|c| c.name == "sale_price").unwrap();
        assert_eq!(price.sql_type, SqlType::Real);
    }

    #[test]
    fn test_shipped_columns_are_nullable() {
        for dataset in DATASETS.iter() {
            for column in dataset.columns {
                assert!(!column.required, "{}.{}", dataset.table, column.name);
                assert!(column.default.is_none());
            }
        }
    }

    #[test]
    fn test_column_builders() {
        let column = ColumnSpec::text("sku").required().with_default("n/a");
        assert!(column.required);
        assert_eq!(column.default, Some("n/a"));
    }

    #[test]
    fn test_reset_sql_drops_before_creating() {
        let sql = reset_sql();
        let last_drop = sql.rfind("DROP TABLE").unwrap();
        let first_create = sql.find("CREATE TABLE").unwrap();
        assert!(last_drop < first_create);
        assert_eq!(sql.matches("DROP TABLE IF EXISTS").count(), 6);
        assert_eq!(sql.matches("CREATE TABLE").count(), 6);
    }
}
