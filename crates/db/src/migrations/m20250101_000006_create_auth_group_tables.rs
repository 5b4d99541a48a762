//! Create permission group tables and seed the default groups.
//!
//! Every instance starts with three groups:
//!
//! - `admin`: every permission
//! - `moderator`: user and post moderation, federation control, invites
//! - `editor`: catalogue editing

use bookwyrm_common::IdGenerator;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    (
        "admin",
        &[
            "edit_instance_settings",
            "set_user_group",
            "control_federation",
            "create_invites",
            "moderate_user",
            "moderate_post",
            "edit_book",
        ],
    ),
    (
        "moderator",
        &[
            "control_federation",
            "create_invites",
            "moderate_user",
            "moderate_post",
            "edit_book",
        ],
    ),
    ("editor", &["edit_book"]),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthGroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthGroup::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuthGroup::Name)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupPermission::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupPermission::GroupId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupPermission::Codename)
                            .string_len(100)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GroupPermission::GroupId)
                            .col(GroupPermission::Codename),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_permission_group")
                            .from(GroupPermission::Table, GroupPermission::GroupId)
                            .to(AuthGroup::Table, AuthGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserGroup::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserGroup::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(UserGroup::GroupId).string_len(32).not_null())
                    .primary_key(
                        Index::create()
                            .col(UserGroup::UserId)
                            .col(UserGroup::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_group_user")
                            .from(UserGroup::Table, UserGroup::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_group_group")
                            .from(UserGroup::Table, UserGroup::GroupId)
                            .to(AuthGroup::Table, AuthGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        seed_default_groups(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserGroup::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupPermission::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthGroup::Table).to_owned())
            .await
    }
}

async fn seed_default_groups(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let backend = manager.get_database_backend();
    let id_gen = IdGenerator::new();

    for (name, permissions) in DEFAULT_GROUPS {
        let insert_group = Query::insert()
            .into_table(AuthGroup::Table)
            .columns([AuthGroup::Id, AuthGroup::Name])
            .values_panic([id_gen.generate().into(), (*name).into()])
            .on_conflict(OnConflict::column(AuthGroup::Name).do_nothing().to_owned())
            .to_owned();
        db.execute(backend.build(&insert_group)).await?;

        let select_group = Query::select()
            .column(AuthGroup::Id)
            .from(AuthGroup::Table)
            .and_where(Expr::col(AuthGroup::Name).eq(*name))
            .to_owned();
        let row = db
            .query_one(backend.build(&select_group))
            .await?
            .ok_or_else(|| DbErr::Migration(format!("group \"{name}\" was not created")))?;
        let group_id: String = row.try_get("", "id")?;

        let mut insert_permissions = Query::insert()
            .into_table(GroupPermission::Table)
            .columns([GroupPermission::GroupId, GroupPermission::Codename])
            .on_conflict(
                OnConflict::columns([GroupPermission::GroupId, GroupPermission::Codename])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        for codename in *permissions {
            insert_permissions.values_panic([group_id.clone().into(), (*codename).into()]);
        }
        db.execute(backend.build(&insert_permissions)).await?;
    }

    Ok(())
}

#[derive(Iden)]
enum AuthGroup {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum GroupPermission {
    Table,
    GroupId,
    Codename,
}

#[derive(Iden)]
enum UserGroup {
    Table,
    UserId,
    GroupId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
