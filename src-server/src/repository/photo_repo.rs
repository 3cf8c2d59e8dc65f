//! Photo Repository Implementation
//!
//! `photos` and `food_photos` share one row shape, so the SQL here is
//! parameterized by table; the food variant attaches reviews on top.

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};

use crate::domain::{
    DomainResult, FoodPhoto, ListQuery, NewPhoto, OwnedEntity, OwnerId, Photo, PhotoPatch,
};

use super::db::DbState;
use super::ownership::{ensure_owner, filter_clause, now_millis};
use super::review_repo::{reviews_for, ReviewTable, FOOD_REVIEWS};
use super::traits::OwnedRepository;

const COLUMNS: &str = "id, owner_id, name, url, storage_path, created_at, updated_at";
const SORTABLE: &[&str] = &["created_at", "updated_at", "name"];

fn row_to_photo(row: &Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        owner_id: OwnerId::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
        url: row.get(3)?,
        storage_path: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn insert(conn: &Connection, table: &str, owner: &OwnerId, draft: &NewPhoto) -> DomainResult<Photo> {
    let now = now_millis();
    let name = draft.name.trim().to_string();
    conn.execute(
        &format!(
            "INSERT INTO {} (owner_id, name, url, storage_path, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            table
        ),
        params![owner.as_str(), name, draft.url, draft.storage_path, now],
    )?;
    Ok(Photo {
        id: conn.last_insert_rowid(),
        owner_id: owner.clone(),
        name,
        url: draft.url.clone(),
        storage_path: draft.storage_path.clone(),
        created_at: now,
        updated_at: now,
    })
}

fn select_one(conn: &Connection, table: &str, id: i64) -> DomainResult<Photo> {
    let photo = conn.query_row(
        &format!("SELECT {} FROM {} WHERE id = ?1", COLUMNS, table),
        params![id],
        row_to_photo,
    )?;
    Ok(photo)
}

fn select_many(
    conn: &Connection,
    table: &str,
    owner: &OwnerId,
    column: &str,
    order: &str,
    pattern: Option<String>,
) -> DomainResult<Vec<Photo>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE owner_id = ?1 AND {} ORDER BY {} {}, id {}",
        COLUMNS,
        table,
        filter_clause("name", 2),
        column,
        order,
        order
    );
    let mut stmt = conn.prepare(&sql)?;
    let photos = stmt
        .query_map(params![owner.as_str(), pattern], row_to_photo)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(photos)
}

fn rename(conn: &Connection, table: &str, id: i64, patch: &PhotoPatch) -> DomainResult<()> {
    conn.execute(
        &format!(
            "UPDATE {} SET name = COALESCE(?1, name), updated_at = ?2 WHERE id = ?3",
            table
        ),
        params![patch.name.as_deref().map(str::trim), now_millis(), id],
    )?;
    Ok(())
}

fn remove(conn: &Connection, table: &str, id: i64) -> DomainResult<()> {
    conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])?;
    Ok(())
}

/// Gallery photos
#[derive(Clone)]
pub struct PhotoRepository {
    db: DbState,
}

impl PhotoRepository {
    const TABLE: &'static str = "photos";

    pub fn new(db: DbState) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnedRepository<Photo> for PhotoRepository {
    async fn create(&self, owner: &OwnerId, draft: &NewPhoto) -> DomainResult<Photo> {
        self.db.call(|conn| insert(conn, Self::TABLE, owner, draft)).await
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> DomainResult<Photo> {
        self.db
            .call(|conn| {
                ensure_owner(conn, Self::TABLE, Photo::NOUN, id, owner)?;
                select_one(conn, Self::TABLE, id)
            })
            .await
    }

    async fn list(&self, owner: &OwnerId, query: &ListQuery) -> DomainResult<Vec<Photo>> {
        let column = query.sort_column(SORTABLE)?;
        let pattern = query.like_pattern();
        self.db
            .call(|conn| select_many(conn, Self::TABLE, owner, column, query.order.as_sql(), pattern))
            .await
    }

    async fn update(&self, owner: &OwnerId, id: i64, patch: &PhotoPatch) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, Self::TABLE, Photo::NOUN, id, owner)?;
                rename(conn, Self::TABLE, id, patch)
            })
            .await
    }

    async fn delete(&self, owner: &OwnerId, id: i64) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, Self::TABLE, Photo::NOUN, id, owner)?;
                remove(conn, Self::TABLE, id)
            })
            .await
    }
}

/// Food photos with their reviews
#[derive(Clone)]
pub struct FoodPhotoRepository {
    db: DbState,
}

impl FoodPhotoRepository {
    const TABLE: &'static str = "food_photos";
    const REVIEWS: ReviewTable = FOOD_REVIEWS;

    pub fn new(db: DbState) -> Self {
        Self { db }
    }
}

fn with_reviews(conn: &Connection, photos: Vec<Photo>) -> DomainResult<Vec<FoodPhoto>> {
    let ids: Vec<i64> = photos.iter().map(|p| p.id).collect();
    let mut reviews = reviews_for(conn, &FoodPhotoRepository::REVIEWS, &ids)?;
    Ok(photos
        .into_iter()
        .map(|p| FoodPhoto {
            reviews: reviews.remove(&p.id).unwrap_or_default(),
            id: p.id,
            owner_id: p.owner_id,
            name: p.name,
            url: p.url,
            storage_path: p.storage_path,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
        .collect())
}

#[async_trait]
impl OwnedRepository<FoodPhoto> for FoodPhotoRepository {
    async fn create(&self, owner: &OwnerId, draft: &NewPhoto) -> DomainResult<FoodPhoto> {
        self.db
            .call(|conn| {
                let photo = insert(conn, Self::TABLE, owner, draft)?;
                Ok(with_reviews(conn, vec![photo])?.remove(0))
            })
            .await
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> DomainResult<FoodPhoto> {
        self.db
            .call(|conn| {
                ensure_owner(conn, Self::TABLE, FoodPhoto::NOUN, id, owner)?;
                let photo = select_one(conn, Self::TABLE, id)?;
                Ok(with_reviews(conn, vec![photo])?.remove(0))
            })
            .await
    }

    async fn list(&self, owner: &OwnerId, query: &ListQuery) -> DomainResult<Vec<FoodPhoto>> {
        let column = query.sort_column(SORTABLE)?;
        let pattern = query.like_pattern();
        self.db
            .call(|conn| {
                let photos =
                    select_many(conn, Self::TABLE, owner, column, query.order.as_sql(), pattern)?;
                with_reviews(conn, photos)
            })
            .await
    }

    async fn update(&self, owner: &OwnerId, id: i64, patch: &PhotoPatch) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, Self::TABLE, FoodPhoto::NOUN, id, owner)?;
                rename(conn, Self::TABLE, id, patch)
            })
            .await
    }

    async fn delete(&self, owner: &OwnerId, id: i64) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, Self::TABLE, FoodPhoto::NOUN, id, owner)?;
                remove(conn, Self::TABLE, id)
            })
            .await
    }
}
