//! Add every superuser to the "admin" group.
//!
//! Runs once, after the default groups exist. The group must already be
//! present: if it is missing the migration fails and nothing is applied.
//! Re-running adds nothing, since membership inserts ignore existing rows.
//! There is no meaningful reverse, so `down` does nothing.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Group that superusers are added to.
pub const ADMIN_GROUP: &str = "admin";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let added = add_superusers_to_group(manager.get_connection(), ADMIN_GROUP).await?;
        tracing::info!(group = ADMIN_GROUP, added, "Backfilled superuser group membership");
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}

/// Make every superuser a member of `group_name`.
///
/// Returns the number of memberships that did not exist before. Fails with
/// [`DbErr::RecordNotFound`] if the group does not exist.
pub async fn add_superusers_to_group<C>(db: &C, group_name: &str) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();

    let select_group = Query::select()
        .column(AuthGroup::Id)
        .from(AuthGroup::Table)
        .and_where(Expr::col(AuthGroup::Name).eq(group_name))
        .to_owned();
    let group = db
        .query_one(backend.build(&select_group))
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("auth group \"{group_name}\"")))?;
    let group_id: String = group.try_get("", "id")?;

    let select_superusers = Query::select()
        .column(User::Id)
        .from(User::Table)
        .and_where(Expr::col(User::IsSuperuser).eq(true))
        .order_by(User::Id, Order::Asc)
        .to_owned();
    let superusers = db.query_all(backend.build(&select_superusers)).await?;

    let mut added = 0;
    for row in superusers {
        let user_id: String = row.try_get("", "id")?;
        let insert = Query::insert()
            .into_table(UserGroup::Table)
            .columns([UserGroup::UserId, UserGroup::GroupId])
            .values_panic([user_id.into(), group_id.clone().into()])
            .on_conflict(
                OnConflict::columns([UserGroup::UserId, UserGroup::GroupId])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        added += db.execute(backend.build(&insert)).await?.rows_affected();
    }

    Ok(added)
}

#[derive(Iden)]
enum AuthGroup {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    IsSuperuser,
}

#[derive(Iden)]
enum UserGroup {
    Table,
    UserId,
    GroupId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_adds_each_superuser_once() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "id" => Value::from("group1")
            }]])
            .append_query_results([[maplit::btreemap! {
                "id" => Value::from("admin1")
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let added = add_superusers_to_group(&db, ADMIN_GROUP).await.unwrap();

        assert_eq!(added, 1);
    }

    #[tokio::test]
    async fn test_existing_membership_is_not_counted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "id" => Value::from("group1")
            }]])
            .append_query_results([[
                maplit::btreemap! { "id" => Value::from("admin1") },
                maplit::btreemap! { "id" => Value::from("admin2") },
            ]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let added = add_superusers_to_group(&db, ADMIN_GROUP).await.unwrap();

        assert_eq!(added, 1);
    }

    #[tokio::test]
    async fn test_missing_group_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let result = add_superusers_to_group(&db, ADMIN_GROUP).await;

        match result {
            Err(DbErr::RecordNotFound(message)) => assert!(message.contains("admin")),
            other => panic!("Expected RecordNotFound, got {other:?}"),
        }
    }
}
