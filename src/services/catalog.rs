//! Cities, cinemas, screens and films: the CRUD surface the staff UI sits on.
//! Ownership cascades in the schema: city -> cinemas -> screens -> seats, and
//! screen -> screenings -> ledger rows.

use sqlx::PgPool;

use crate::error::ServiceError;
use crate::models::{Cinema, City, Film, Screen};

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /* ---------- cities ---------- */

    pub async fn create_city(&self, name: &str, country: &str) -> Result<City, ServiceError> {
        let name = name.trim();
        let country = country.trim();
        if name.is_empty() || country.is_empty() {
            return Err(ServiceError::Validation(
                "city name and country must not be empty".to_string(),
            ));
        }

        sqlx::query_as::<_, City>(
            "INSERT INTO cities (name, country) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(country)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                ServiceError::Validation(format!("city '{name}, {country}' already exists"))
            } else {
                e.into()
            }
        })
    }

    pub async fn get_city(&self, id: i64) -> Result<Option<City>, ServiceError> {
        Ok(sqlx::query_as::<_, City>("SELECT * FROM cities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_cities(&self) -> Result<Vec<City>, ServiceError> {
        Ok(sqlx::query_as::<_, City>("SELECT * FROM cities ORDER BY country, name")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update_city(
        &self,
        id: i64,
        name: &str,
        country: &str,
    ) -> Result<City, ServiceError> {
        let name = name.trim();
        let country = country.trim();
        if name.is_empty() || country.is_empty() {
            return Err(ServiceError::Validation(
                "city name and country must not be empty".to_string(),
            ));
        }

        sqlx::query_as::<_, City>(
            "UPDATE cities SET name = $1, country = $2 WHERE id = $3 RETURNING *",
        )
        .bind(name)
        .bind(country)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                ServiceError::Validation(format!("city '{name}, {country}' already exists"))
            } else {
                e.into()
            }
        })?
        .ok_or(ServiceError::NotFound("city"))
    }

    pub async fn delete_city(&self, id: i64) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM cities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::NotFound("city"));
        }
        Ok(())
    }

    /* ---------- cinemas ---------- */

    pub async fn create_cinema(
        &self,
        name: &str,
        address: &str,
        city_id: i64,
    ) -> Result<Cinema, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "cinema name must not be empty".to_string(),
            ));
        }
        if self.get_city(city_id).await?.is_none() {
            return Err(ServiceError::NotFound("city"));
        }

        Ok(sqlx::query_as::<_, Cinema>(
            "INSERT INTO cinemas (name, address, city_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(address)
        .bind(city_id)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn get_cinema(&self, id: i64) -> Result<Option<Cinema>, ServiceError> {
        Ok(sqlx::query_as::<_, Cinema>("SELECT * FROM cinemas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_cinemas_in_city(&self, city_id: i64) -> Result<Vec<Cinema>, ServiceError> {
        Ok(sqlx::query_as::<_, Cinema>(
            "SELECT * FROM cinemas WHERE city_id = $1 ORDER BY name",
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn update_cinema(
        &self,
        id: i64,
        name: &str,
        address: &str,
    ) -> Result<Cinema, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "cinema name must not be empty".to_string(),
            ));
        }

        sqlx::query_as::<_, Cinema>(
            "UPDATE cinemas SET name = $1, address = $2 WHERE id = $3 RETURNING *",
        )
        .bind(name)
        .bind(address)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServiceError::NotFound("cinema"))
    }

    pub async fn delete_cinema(&self, id: i64) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM cinemas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::NotFound("cinema"));
        }
        Ok(())
    }

    /* ---------- screens ---------- */

    pub async fn create_screen(
        &self,
        cinema_id: i64,
        name: &str,
        row_count: i32,
        seats_per_row: i32,
    ) -> Result<Screen, ServiceError> {
        if row_count <= 0 || seats_per_row <= 0 {
            return Err(ServiceError::Validation(
                "screen geometry must be positive".to_string(),
            ));
        }
        if self.get_cinema(cinema_id).await?.is_none() {
            return Err(ServiceError::NotFound("cinema"));
        }

        Ok(sqlx::query_as::<_, Screen>(
            "INSERT INTO screens (cinema_id, name, row_count, seats_per_row)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(cinema_id)
        .bind(name)
        .bind(row_count)
        .bind(seats_per_row)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn get_screen(&self, id: i64) -> Result<Option<Screen>, ServiceError> {
        Ok(sqlx::query_as::<_, Screen>("SELECT * FROM screens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_screens_for_cinema(&self, cinema_id: i64) -> Result<Vec<Screen>, ServiceError> {
        Ok(sqlx::query_as::<_, Screen>(
            "SELECT * FROM screens WHERE cinema_id = $1 ORDER BY name",
        )
        .bind(cinema_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Geometry may grow freely but must still cover every existing seat.
    pub async fn update_screen(
        &self,
        id: i64,
        name: &str,
        row_count: i32,
        seats_per_row: i32,
    ) -> Result<Screen, ServiceError> {
        if row_count <= 0 || seats_per_row <= 0 {
            return Err(ServiceError::Validation(
                "screen geometry must be positive".to_string(),
            ));
        }

        let (max_row, max_number): (Option<i32>, Option<i32>) =
            sqlx::query_as("SELECT MAX(\"row\"), MAX(number) FROM seats WHERE screen_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if max_row.unwrap_or(0) > row_count || max_number.unwrap_or(0) > seats_per_row {
            return Err(ServiceError::Validation(
                "screen geometry cannot shrink below existing seats".to_string(),
            ));
        }

        sqlx::query_as::<_, Screen>(
            "UPDATE screens SET name = $1, row_count = $2, seats_per_row = $3
             WHERE id = $4
             RETURNING *",
        )
        .bind(name)
        .bind(row_count)
        .bind(seats_per_row)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServiceError::NotFound("screen"))
    }

    /// Cascades to seats, screenings and their ledger rows via FKs.
    pub async fn delete_screen(&self, id: i64) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM screens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::NotFound("screen"));
        }
        Ok(())
    }

    /* ---------- films ---------- */

    pub async fn create_film(
        &self,
        title: &str,
        duration_minutes: i32,
    ) -> Result<Film, ServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation(
                "film title must not be empty".to_string(),
            ));
        }
        if duration_minutes <= 0 {
            return Err(ServiceError::Validation(
                "film duration must be positive".to_string(),
            ));
        }

        Ok(sqlx::query_as::<_, Film>(
            "INSERT INTO films (title, duration_minutes) VALUES ($1, $2) RETURNING *",
        )
        .bind(title)
        .bind(duration_minutes)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn get_film(&self, id: i64) -> Result<Option<Film>, ServiceError> {
        Ok(sqlx::query_as::<_, Film>("SELECT * FROM films WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_films(&self) -> Result<Vec<Film>, ServiceError> {
        Ok(sqlx::query_as::<_, Film>("SELECT * FROM films ORDER BY title")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update_film(
        &self,
        id: i64,
        title: &str,
        duration_minutes: i32,
    ) -> Result<Film, ServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation(
                "film title must not be empty".to_string(),
            ));
        }
        if duration_minutes <= 0 {
            return Err(ServiceError::Validation(
                "film duration must be positive".to_string(),
            ));
        }

        sqlx::query_as::<_, Film>(
            "UPDATE films SET title = $1, duration_minutes = $2 WHERE id = $3 RETURNING *",
        )
        .bind(title)
        .bind(duration_minutes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServiceError::NotFound("film"))
    }

    pub async fn delete_film(&self, id: i64) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::NotFound("film"));
        }
        Ok(())
    }
}
