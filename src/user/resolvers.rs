use std::collections::BTreeSet;

use serde::Deserialize;

use crate::auth::{filter_visible, gate, CallerContext, Gate, Handler, Role, RolePolicy};
use crate::request_context::RequestContext;
use crate::response::Mutation;
use crate::Error;

use super::model::{User, UserPatch};
use super::store::UserFilter;

/// Tenant restriction applied to mutation filters: elevated callers write
/// across scopes, everyone else only within their own. An out-of-scope
/// write therefore matches zero documents instead of relying on the store's
/// treatment of an absent condition.
fn scope_restriction(caller: &CallerContext) -> Option<String> {
    if caller.is_super() {
        None
    } else {
        Some(caller.scope.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserByIdArgs {
    pub id: String,
}

/// Resolve one user by id through the request's batching loader. A missing
/// user is `None`, not an error.
pub struct GetUser;

#[async_trait::async_trait]
impl Handler for GetUser {
    type Input = UserByIdArgs;
    type Output = Option<User>;

    async fn handle(
        &self,
        args: UserByIdArgs,
        ctx: &RequestContext,
    ) -> crate::Result<Option<User>> {
        if args.id.is_empty() {
            return Err(Error::validation("user id must not be empty"));
        }
        let user = ctx.users.load_one(args.id).await?;
        Ok(user)
    }
}

/// List users visible to the caller: all of them for `Super`, own-scope
/// otherwise.
pub struct ListUsers;

#[async_trait::async_trait]
impl Handler for ListUsers {
    type Input = ();
    type Output = Vec<User>;

    async fn handle(&self, _: (), ctx: &RequestContext) -> crate::Result<Vec<User>> {
        let users = ctx.store.list().await?;
        Ok(filter_visible(&ctx.caller, users))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserArgs {
    pub id: String,
    pub name: String,
    pub roles: Vec<String>,
    pub scope: String,
}

pub struct CreateUser;

#[async_trait::async_trait]
impl Handler for CreateUser {
    type Input = CreateUserArgs;
    type Output = User;

    async fn handle(&self, args: CreateUserArgs, ctx: &RequestContext) -> crate::Result<User> {
        if args.id.is_empty() {
            return Err(Error::validation("user id must not be empty"));
        }
        if args.name.is_empty() {
            return Err(Error::validation("user name must not be empty"));
        }
        // Role names are validated before any store call.
        let roles = args
            .roles
            .iter()
            .map(|name| name.parse::<Role>())
            .collect::<Result<BTreeSet<Role>, _>>()
            .map_err(|err| Error::validation(err.to_string()))?;

        let user = User { id: args.id, name: args.name, roles, scope: args.scope };
        ctx.store.insert_one(user.clone()).await?;
        ctx.users.feed_one(user.id.clone(), user.clone()).await;
        Ok(user)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserArgs {
    pub id: String,
    pub name: Option<String>,
    pub roles: Option<Vec<String>>,
}

pub struct UpdateUser;

#[async_trait::async_trait]
impl Handler for UpdateUser {
    type Input = UpdateUserArgs;
    type Output = Mutation;

    async fn handle(
        &self,
        args: UpdateUserArgs,
        ctx: &RequestContext,
    ) -> crate::Result<Mutation> {
        if args.id.is_empty() {
            return Err(Error::validation("user id must not be empty"));
        }
        let roles = args
            .roles
            .map(|names| {
                names
                    .iter()
                    .map(|name| name.parse::<Role>())
                    .collect::<Result<BTreeSet<Role>, _>>()
            })
            .transpose()
            .map_err(|err| Error::validation(err.to_string()))?;
        let patch = UserPatch { name: args.name, roles };

        let filter = UserFilter {
            id: args.id.clone(),
            scope: scope_restriction(&ctx.caller),
        };
        let affected = ctx.store.update_one(&filter, &patch).await?;
        if affected == 0 {
            return Err(Error::not_found("user", args.id));
        }
        ctx.users.invalidate(&args.id);
        Ok(Mutation { affected, ids: vec![args.id] })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUserArgs {
    pub id: String,
}

pub struct DeleteUser;

#[async_trait::async_trait]
impl Handler for DeleteUser {
    type Input = DeleteUserArgs;
    type Output = Mutation;

    async fn handle(
        &self,
        args: DeleteUserArgs,
        ctx: &RequestContext,
    ) -> crate::Result<Mutation> {
        if args.id.is_empty() {
            return Err(Error::validation("user id must not be empty"));
        }
        let filter = UserFilter {
            id: args.id.clone(),
            scope: scope_restriction(&ctx.caller),
        };
        // An out-of-scope delete affects zero rows; that is a count, not an
        // error.
        let affected = ctx.store.delete_one(&filter).await?;
        if affected > 0 {
            ctx.users.invalidate(&args.id);
        }
        Ok(Mutation { affected, ids: vec![args.id] })
    }
}

pub fn get_user() -> Gate<GetUser> {
    gate(
        RolePolicy::any([Role::Super, Role::Admin, Role::Teacher]),
        GetUser,
    )
}

pub fn list_users() -> Gate<ListUsers> {
    gate(
        RolePolicy::any([Role::Super, Role::Admin, Role::Teacher]),
        ListUsers,
    )
}

pub fn create_user() -> Gate<CreateUser> {
    gate(RolePolicy::any([Role::Super, Role::Admin]), CreateUser)
}

pub fn update_user() -> Gate<UpdateUser> {
    gate(RolePolicy::any([Role::Super, Role::Admin]), UpdateUser)
}

pub fn delete_user() -> Gate<DeleteUser> {
    gate(RolePolicy::any([Role::Super, Role::Admin]), DeleteUser)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::Batch;
    use crate::response::Mutation;
    use crate::user::{InMemoryUserStore, User, UserStore};
    use crate::Error;

    fn user(id: &str, name: &str, scope: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            roles: BTreeSet::from([Role::Teacher]),
            scope: scope.to_string(),
        }
    }

    fn seeded_store() -> Arc<InMemoryUserStore> {
        Arc::new(InMemoryUserStore::with_users([
            user("u1", "Asha", "A"),
            user("u2", "Bjorn", "A"),
            user("u3", "Chandra", "B"),
        ]))
    }

    fn ctx(store: Arc<InMemoryUserStore>, roles: &[Role], scope: &str) -> RequestContext {
        let caller =
            CallerContext::new("caller-1", scope).roles(roles.iter().copied().collect());
        RequestContext::new(caller, store, &Batch::default())
    }

    #[tokio::test]
    async fn get_user_resolves_through_the_loader() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Teacher], "A");

        let found = GetUser
            .handle(UserByIdArgs { id: "u1".to_string() }, &ctx)
            .await
            .unwrap();
        assert_eq!(found.unwrap().name, "Asha");

        let missing = GetUser
            .handle(UserByIdArgs { id: "nope".to_string() }, &ctx)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn get_user_rejects_an_empty_id_before_fetching() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Teacher], "A");

        let result = GetUser
            .handle(UserByIdArgs { id: String::new() }, &ctx)
            .await;

        assert_eq!(
            result.unwrap_err(),
            Error::validation("user id must not be empty")
        );
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn list_users_applies_two_tier_visibility() {
        let store = seeded_store();

        let scoped = ctx(store.clone(), &[Role::Admin], "A");
        let visible = ListUsers.handle((), &scoped).await.unwrap();
        assert_eq!(
            visible.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(),
            vec!["u1", "u2"]
        );

        let elevated = ctx(store, &[Role::Super], "A");
        let all = ListUsers.handle((), &elevated).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn create_user_rejects_unknown_role_names_before_writing() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Admin], "A");

        let result = CreateUser
            .handle(
                CreateUserArgs {
                    id: "u4".to_string(),
                    name: "Drew".to_string(),
                    roles: vec!["wizard".to_string()],
                    scope: "A".to_string(),
                },
                &ctx,
            )
            .await;

        assert_eq!(
            result.unwrap_err(),
            Error::validation("unknown role: wizard")
        );
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn create_user_primes_the_loader_cache() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Admin], "A");

        CreateUser
            .handle(
                CreateUserArgs {
                    id: "u4".to_string(),
                    name: "Drew".to_string(),
                    roles: vec!["teacher".to_string()],
                    scope: "A".to_string(),
                },
                &ctx,
            )
            .await
            .unwrap();

        let loaded = ctx
            .users
            .load_one("u4".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Drew");
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn update_user_invalidates_the_cached_entity() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Admin], "A");

        let before = ctx
            .users
            .load_one("u1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.name, "Asha");

        let mutation = UpdateUser
            .handle(
                UpdateUserArgs {
                    id: "u1".to_string(),
                    name: Some("Asha P".to_string()),
                    roles: None,
                },
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(
            mutation,
            Mutation { affected: 1, ids: vec!["u1".to_string()] }
        );

        let after = ctx
            .users
            .load_one("u1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.name, "Asha P");
        assert_eq!(store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn update_user_outside_scope_is_not_found() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Admin], "A");

        let result = UpdateUser
            .handle(
                UpdateUserArgs {
                    id: "u3".to_string(),
                    name: Some("renamed".to_string()),
                    roles: None,
                },
                &ctx,
            )
            .await;

        assert_eq!(result.unwrap_err(), Error::not_found("user", "u3"));
        assert_eq!(store.list().await.unwrap()[2].name, "Chandra");
    }

    #[tokio::test]
    async fn delete_user_outside_scope_affects_zero_rows() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Admin], "A");

        let mutation = DeleteUser
            .handle(DeleteUserArgs { id: "u3".to_string() }, &ctx)
            .await
            .unwrap();

        assert_eq!(
            mutation,
            Mutation { affected: 0, ids: vec!["u3".to_string()] }
        );
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn super_caller_deletes_across_scopes() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Super], "A");

        let mutation = DeleteUser
            .handle(DeleteUserArgs { id: "u3".to_string() }, &ctx)
            .await
            .unwrap();

        assert_eq!(
            mutation,
            Mutation { affected: 1, ids: vec!["u3".to_string()] }
        );
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn gated_create_denies_a_teacher() {
        let store = seeded_store();
        let ctx = ctx(store.clone(), &[Role::Teacher], "A");

        let result = create_user()
            .handle(
                CreateUserArgs {
                    id: "u4".to_string(),
                    name: "Drew".to_string(),
                    roles: vec!["teacher".to_string()],
                    scope: "A".to_string(),
                },
                &ctx,
            )
            .await;

        assert!(matches!(result, Err(Error::Auth(_))));
        assert_eq!(store.list().await.unwrap().len(), 3);
    }
}
