use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Row, Type};
use tracing::{debug, info};
use vat_core::{
    DocumentType, FiscalRegime, NewVehicleRecord, RepositoryError, TaxResult, VehicleRecord,
    VehicleRepository,
};

use crate::decimal::{decimal_to_f64, get_optional_amount};

const SELECT_VEHICLE: &str = "SELECT id, plate, brand, chassis_number, isv, accounting_entry,
        purchase_date, purchase_document, document_type, purchase_value,
        sale_date, sale_document, sale_value,
        tax_rate, regime, taxable_base, tax_amount,
        created_at, updated_at
     FROM vehicles";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to `database_url`, creating the database file if needed.
    ///
    /// An in-memory database lives only as long as its connection, so it
    /// gets a single connection that is never recycled.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        info!(url = %database_url, "connected to database");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn get<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
}

fn row_to_vehicle(row: &SqliteRow) -> Result<VehicleRecord, RepositoryError> {
    let document_type: String = get(row, "document_type")?;
    let document_type = DocumentType::parse(&document_type).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid document type: {}", document_type))
    })?;

    let regime = get::<Option<String>>(row, "regime")?
        .map(|tag| {
            FiscalRegime::parse(&tag)
                .ok_or_else(|| RepositoryError::Database(format!("Invalid regime: {}", tag)))
        })
        .transpose()?;

    let tax = match (
        get_optional_amount(row, "taxable_base")?,
        get_optional_amount(row, "tax_amount")?,
    ) {
        (Some(taxable_base), Some(tax_amount)) => Some(TaxResult {
            taxable_base,
            tax_amount,
        }),
        _ => None,
    };

    Ok(VehicleRecord {
        id: get(row, "id")?,
        plate: get(row, "plate")?,
        brand: get(row, "brand")?,
        chassis_number: get(row, "chassis_number")?,
        isv: get_optional_amount(row, "isv")?,
        accounting_entry: get(row, "accounting_entry")?,
        purchase_date: get(row, "purchase_date")?,
        purchase_document: get(row, "purchase_document")?,
        document_type,
        purchase_value: get_optional_amount(row, "purchase_value")?,
        sale_date: get(row, "sale_date")?,
        sale_document: get(row, "sale_document")?,
        sale_value: get_optional_amount(row, "sale_value")?,
        tax_rate_percent: get_optional_amount(row, "tax_rate")?,
        regime,
        tax: regime.and(tax),
        created_at: get::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get::<DateTime<Utc>>(row, "updated_at")?,
    })
}

#[async_trait]
impl VehicleRepository for SqliteRepository {
    async fn create_vehicle(
        &self,
        vehicle: NewVehicleRecord,
    ) -> Result<VehicleRecord, RepositoryError> {
        let now = Utc::now();
        let tax = vehicle.regime.and(vehicle.tax);

        let result = sqlx::query(
            "INSERT INTO vehicles (
                plate, brand, chassis_number, isv, accounting_entry,
                purchase_date, purchase_document, document_type, purchase_value,
                sale_date, sale_document, sale_value,
                tax_rate, regime, taxable_base, tax_amount,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&vehicle.plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.chassis_number)
        .bind(vehicle.isv.map(decimal_to_f64))
        .bind(&vehicle.accounting_entry)
        .bind(vehicle.purchase_date)
        .bind(&vehicle.purchase_document)
        .bind(vehicle.document_type.as_str())
        .bind(vehicle.purchase_value.map(decimal_to_f64))
        .bind(vehicle.sale_date)
        .bind(&vehicle.sale_document)
        .bind(vehicle.sale_value.map(decimal_to_f64))
        .bind(vehicle.tax_rate_percent.map(decimal_to_f64))
        .bind(vehicle.regime.map(|regime| regime.as_str()))
        .bind(tax.map(|tax| decimal_to_f64(tax.taxable_base)))
        .bind(tax.map(|tax| decimal_to_f64(tax.tax_amount)))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        debug!(id, plate = %vehicle.plate, "created vehicle record");
        self.get_vehicle(id).await
    }

    async fn get_vehicle(
        &self,
        id: i64,
    ) -> Result<VehicleRecord, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_VEHICLE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_vehicle(&row)
    }

    async fn update_vehicle(
        &self,
        vehicle: &VehicleRecord,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let tax = vehicle.regime.and(vehicle.tax);

        let result = sqlx::query(
            "UPDATE vehicles SET
                plate = ?, brand = ?, chassis_number = ?, isv = ?, accounting_entry = ?,
                purchase_date = ?, purchase_document = ?, document_type = ?, purchase_value = ?,
                sale_date = ?, sale_document = ?, sale_value = ?,
                tax_rate = ?, regime = ?, taxable_base = ?, tax_amount = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&vehicle.plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.chassis_number)
        .bind(vehicle.isv.map(decimal_to_f64))
        .bind(&vehicle.accounting_entry)
        .bind(vehicle.purchase_date)
        .bind(&vehicle.purchase_document)
        .bind(vehicle.document_type.as_str())
        .bind(vehicle.purchase_value.map(decimal_to_f64))
        .bind(vehicle.sale_date)
        .bind(&vehicle.sale_document)
        .bind(vehicle.sale_value.map(decimal_to_f64))
        .bind(vehicle.tax_rate_percent.map(decimal_to_f64))
        .bind(vehicle.regime.map(|regime| regime.as_str()))
        .bind(tax.map(|tax| decimal_to_f64(tax.taxable_base)))
        .bind(tax.map(|tax| decimal_to_f64(tax.tax_amount)))
        .bind(now)
        .bind(vehicle.id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id = vehicle.id, "updated vehicle record");
        Ok(())
    }

    async fn delete_vehicle(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id, "deleted vehicle record");
        Ok(())
    }

    async fn list_vehicles(&self) -> Result<Vec<VehicleRecord>, RepositoryError> {
        let rows = sqlx::query(&format!("{} ORDER BY id ASC", SELECT_VEHICLE))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_vehicle).collect()
    }
}
