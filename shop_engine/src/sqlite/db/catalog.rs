//! Lookup tables: countries and categories.
use sqlx::SqliteConnection;

use crate::db_types::{Category, Country};

pub async fn fetch_country(id: &str, conn: &mut SqliteConnection) -> Result<Option<Country>, sqlx::Error> {
    let country = sqlx::query_as("SELECT * FROM countries WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(country)
}

pub async fn fetch_countries(conn: &mut SqliteConnection) -> Result<Vec<Country>, sqlx::Error> {
    let countries = sqlx::query_as("SELECT * FROM countries ORDER BY name ASC").fetch_all(conn).await?;
    Ok(countries)
}

pub async fn upsert_country(country: Country, conn: &mut SqliteConnection) -> Result<Country, sqlx::Error> {
    let country: Country = sqlx::query_as(
        "INSERT INTO countries (id, name) VALUES ($1, $2) ON CONFLICT(id) DO UPDATE SET name = excluded.name \
         RETURNING *",
    )
    .bind(country.id)
    .bind(country.name)
    .fetch_all(conn)
    .await?
    .into_iter()
    .next()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(country)
}

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, sqlx::Error> {
    let categories = sqlx::query_as("SELECT * FROM categories ORDER BY name ASC").fetch_all(conn).await?;
    Ok(categories)
}

pub async fn upsert_category(category: Category, conn: &mut SqliteConnection) -> Result<Category, sqlx::Error> {
    let category: Category = sqlx::query_as(
        "INSERT INTO categories (id, name) VALUES ($1, $2) ON CONFLICT(id) DO UPDATE SET name = excluded.name \
         RETURNING *",
    )
    .bind(category.id)
    .bind(category.name)
    .fetch_all(conn)
    .await?
    .into_iter()
    .next()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(category)
}
