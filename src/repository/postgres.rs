use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::{FromRow, PgExecutor};
use std::collections::HashMap;

use super::{ClientRepository, EventRepository};
use crate::models::{Client, ClientRecord, Event};
use crate::utils::{AppError, AppResult};

/// Postgres-backed store for both clients and events.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    client_id: i32,
    email: String,
    username: String,
    password: String,
}

impl ClientRow {
    fn with_events(self, attended_events: Vec<Event>) -> Client {
        Client {
            client_id: self.client_id,
            email: self.email,
            username: self.username,
            password: self.password,
            attended_events,
        }
    }
}

/// An event joined through `attendees`, tagged with the attending client.
#[derive(Debug, FromRow)]
struct AttendanceRow {
    client_id: i32,
    event_id: i32,
    title: String,
    description: String,
    date: Option<NaiveDateTime>,
    image_url: String,
    price: Option<Decimal>,
}

impl AttendanceRow {
    fn split(self) -> (i32, Event) {
        (
            self.client_id,
            Event {
                event_id: self.event_id,
                title: self.title,
                description: self.description,
                date: self.date,
                image_url: self.image_url,
                price: self.price,
            },
        )
    }
}

/// Maps constraint violations to a bad request carrying the database message.
fn constraint_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() {
            return AppError::BadRequest(db.message().to_string());
        }
    }
    AppError::Database(err)
}

async fn attended_events<'e, E>(executor: E, client_id: i32) -> Result<Vec<Event>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Event>(
        r#"
        SELECT e.event_id, e.title, e.description, e.date, e.image_url, e.price
        FROM events e
        JOIN attendees a ON a.event_id = e.event_id
        WHERE a.client_id = $1
        ORDER BY e.event_id
        "#,
    )
    .bind(client_id)
    .fetch_all(executor)
    .await
}

#[async_trait]
impl ClientRepository for PgStore {
    async fn find_all(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            "SELECT client_id, email, username, password FROM clients ORDER BY client_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let attendance = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT a.client_id, e.event_id, e.title, e.description, e.date, e.image_url, e.price
            FROM attendees a
            JOIN events e ON e.event_id = a.event_id
            ORDER BY e.event_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut events_by_client: HashMap<i32, Vec<Event>> = HashMap::new();
        for row in attendance {
            let (client_id, event) = row.split();
            events_by_client.entry(client_id).or_default().push(event);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let events = events_by_client.remove(&row.client_id).unwrap_or_default();
                row.with_events(events)
            })
            .collect())
    }

    async fn find_by_id(&self, client_id: i32) -> AppResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT client_id, email, username, password FROM clients WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let events = attended_events(&self.pool, client_id).await?;
                Ok(Some(row.with_events(events)))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, record: ClientRecord) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clients (email, username, password)
            VALUES ($1, $2, $3)
            RETURNING client_id, email, username, password
            "#,
        )
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.password)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_violation)?;

        tracing::debug!(client_id = row.client_id, "Inserted client row");
        Ok(row.with_events(Vec::new()))
    }

    async fn update(&self, client: Client) -> AppResult<Option<Client>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET email = $2, username = $3, password = $4
            WHERE client_id = $1
            RETURNING client_id, email, username, password
            "#,
        )
        .bind(client.client_id)
        .bind(&client.email)
        .bind(&client.username)
        .bind(&client.password)
        .fetch_optional(&mut *tx)
        .await
        .map_err(constraint_violation)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let events = attended_events(&mut *tx, row.client_id).await?;
        tx.commit().await?;

        Ok(Some(row.with_events(events)))
    }

    async fn delete(&self, client_id: i32) -> AppResult<Option<Client>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT client_id, email, username, password FROM clients WHERE client_id = $1 FOR UPDATE",
        )
        .bind(client_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let events = attended_events(&mut *tx, client_id).await?;

        // attendees rows go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM clients WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row.with_events(events)))
    }

    async fn add_attended_event(&self, client_id: i32, event_id: i32) -> AppResult<Option<Client>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT client_id, email, username, password FROM clients WHERE client_id = $1 FOR UPDATE",
        )
        .bind(client_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO attendees (client_id, event_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(client_id)
        .bind(event_id)
        .execute(&mut *tx)
        .await
        .map_err(constraint_violation)?;

        let events = attended_events(&mut *tx, client_id).await?;
        tx.commit().await?;

        Ok(Some(row.with_events(events)))
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn find_all(&self) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT event_id, title, description, date, image_url, price FROM events ORDER BY event_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find_by_id(&self, event_id: i32) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT event_id, title, description, date, image_url, price FROM events WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn insert(&self, event: Event) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, date, image_url, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING event_id, title, description, date, image_url, price
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.image_url)
        .bind(event.price)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_violation)?;

        tracing::debug!(event_id = event.event_id, "Inserted event row");
        Ok(event)
    }

    async fn update(&self, event: Event) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $2, description = $3, date = $4, image_url = $5, price = $6
            WHERE event_id = $1
            RETURNING event_id, title, description, date, image_url, price
            "#,
        )
        .bind(event.event_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.image_url)
        .bind(event.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(constraint_violation)?;

        Ok(event)
    }

    async fn delete(&self, event_id: i32) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            DELETE FROM events
            WHERE event_id = $1
            RETURNING event_id, title, description, date, image_url, price
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }
}
