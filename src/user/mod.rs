mod loader;
mod model;
mod resolvers;
mod store;

pub use loader::UserLoader;
pub use model::{User, UserPatch};
pub use resolvers::{
    create_user, delete_user, get_user, list_users, update_user, CreateUser, CreateUserArgs,
    DeleteUser, DeleteUserArgs, GetUser, ListUsers, UpdateUser, UpdateUserArgs, UserByIdArgs,
};
pub use store::{InMemoryUserStore, StoreError, UserFilter, UserStore};
