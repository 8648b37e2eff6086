//! Ticket price resolution.
//!
//! Only the Lower Class price is stored, per (city, time-of-day), in the
//! city_pricing table. Upper Class and VIP are derived with the multipliers
//! in [`PricingPolicy`]. The stock policy reproduces the legacy formula where
//! VIP multiplies the Lower Class price (so VIP equals Upper Class at the
//! default 1.2); the tiered flag stacks the VIP multiplier on top of Upper.

use sqlx::PgPool;

use crate::config::PricingConfig;
use crate::error::ServiceError;
use crate::models::{CityPricing, SeatClass, TimeOfDay};

#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    pub upper_multiplier: f64,
    pub vip_multiplier: f64,
    pub vip_tiered: bool,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            upper_multiplier: 1.2,
            vip_multiplier: 1.2,
            vip_tiered: false,
        }
    }
}

impl From<&PricingConfig> for PricingPolicy {
    fn from(cfg: &PricingConfig) -> Self {
        Self {
            upper_multiplier: cfg.upper_multiplier,
            vip_multiplier: cfg.vip_multiplier,
            vip_tiered: cfg.vip_tiered,
        }
    }
}

impl PricingPolicy {
    /// Derives the price for a class from the Lower Class base price.
    pub fn price_for(&self, base: f64, class: SeatClass) -> f64 {
        match class {
            SeatClass::Lower => base,
            SeatClass::Upper => base * self.upper_multiplier,
            SeatClass::Vip => {
                if self.vip_tiered {
                    base * self.upper_multiplier * self.vip_multiplier
                } else {
                    base * self.vip_multiplier
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct PricingService {
    pool: PgPool,
    policy: PricingPolicy,
}

impl PricingService {
    pub fn new(pool: PgPool, policy: PricingPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn policy(&self) -> PricingPolicy {
        self.policy
    }

    /// Resolves the price for (city, seat class, time-of-day). Pure read.
    pub async fn get_price(
        &self,
        city_id: i64,
        class: SeatClass,
        time_of_day: TimeOfDay,
    ) -> Result<f64, ServiceError> {
        let base: Option<f64> = sqlx::query_scalar(
            "SELECT base_price FROM city_pricing WHERE city_id = $1 AND time_of_day = $2",
        )
        .bind(city_id)
        .bind(time_of_day.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let base = base.ok_or(ServiceError::PriceNotFound {
            city_id,
            time_of_day: time_of_day.to_string(),
        })?;

        Ok(self.policy.price_for(base, class))
    }

    pub async fn add_price(
        &self,
        city_id: i64,
        time_of_day: TimeOfDay,
        base_price: f64,
    ) -> Result<CityPricing, ServiceError> {
        if base_price < 0.0 {
            return Err(ServiceError::Validation(
                "base price must not be negative".to_string(),
            ));
        }

        let city_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cities WHERE id = $1)")
                .bind(city_id)
                .fetch_one(&self.pool)
                .await?;
        if !city_exists {
            return Err(ServiceError::NotFound("city"));
        }

        sqlx::query_as::<_, CityPricing>(
            "INSERT INTO city_pricing (city_id, time_of_day, base_price)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(city_id)
        .bind(time_of_day.as_str())
        .bind(base_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                ServiceError::Validation(format!(
                    "price for city {city_id} at {time_of_day} already exists"
                ))
            } else {
                e.into()
            }
        })
    }

    pub async fn update_price(
        &self,
        city_id: i64,
        time_of_day: TimeOfDay,
        base_price: f64,
    ) -> Result<(), ServiceError> {
        if base_price < 0.0 {
            return Err(ServiceError::Validation(
                "base price must not be negative".to_string(),
            ));
        }

        let res = sqlx::query(
            "UPDATE city_pricing SET base_price = $1 WHERE city_id = $2 AND time_of_day = $3",
        )
        .bind(base_price)
        .bind(city_id)
        .bind(time_of_day.as_str())
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(ServiceError::PriceNotFound {
                city_id,
                time_of_day: time_of_day.to_string(),
            });
        }
        Ok(())
    }

    pub async fn delete_price(
        &self,
        city_id: i64,
        time_of_day: TimeOfDay,
    ) -> Result<(), ServiceError> {
        let res =
            sqlx::query("DELETE FROM city_pricing WHERE city_id = $1 AND time_of_day = $2")
                .bind(city_id)
                .bind(time_of_day.as_str())
                .execute(&self.pool)
                .await?;

        if res.rows_affected() == 0 {
            return Err(ServiceError::PriceNotFound {
                city_id,
                time_of_day: time_of_day.to_string(),
            });
        }
        Ok(())
    }

    pub async fn get_prices_for_city(
        &self,
        city_id: i64,
    ) -> Result<Vec<CityPricing>, ServiceError> {
        Ok(sqlx::query_as::<_, CityPricing>(
            "SELECT * FROM city_pricing WHERE city_id = $1 ORDER BY time_of_day",
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_class_is_the_base_price() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.price_for(10.0, SeatClass::Lower), 10.0);
    }

    #[test]
    fn upper_class_is_base_times_multiplier() {
        let policy = PricingPolicy::default();
        assert!((policy.price_for(10.0, SeatClass::Upper) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn default_vip_reproduces_legacy_formula() {
        // Legacy behavior: VIP = Lower x 1.2, same as Upper Class.
        let policy = PricingPolicy::default();
        assert!((policy.price_for(10.0, SeatClass::Vip) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn tiered_vip_stacks_on_upper() {
        let policy = PricingPolicy {
            vip_tiered: true,
            ..PricingPolicy::default()
        };
        assert!((policy.price_for(10.0, SeatClass::Vip) - 14.4).abs() < 1e-9);
    }

    #[test]
    fn custom_multipliers_apply() {
        let policy = PricingPolicy {
            upper_multiplier: 1.5,
            vip_multiplier: 2.0,
            vip_tiered: false,
        };
        assert!((policy.price_for(8.0, SeatClass::Upper) - 12.0).abs() < 1e-9);
        assert!((policy.price_for(8.0, SeatClass::Vip) - 16.0).abs() < 1e-9);
    }
}
