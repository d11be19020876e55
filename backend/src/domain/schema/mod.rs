//! User schema: root field definitions, argument coercion, and resolvers.
//!
//! ```text
//! type Query    { hello: String  getUser(id: ID!): PublicUser  listNUsers(n: Int): [PublicUser] }
//! type Mutation { echo(mssg: String!): String  createUser(usrInfo: UserInput): Boolean
//!                 updateUser(id: ID!, usrInfo: UserUpdateInput): Boolean  deleteUser(id: ID!): Boolean }
//! ```

mod arguments;
mod executor;
mod resolvers;

pub use executor::{ExecutionResult, QueryError, Schema};
pub use resolvers::{ResolverFailure, UserResolvers};
