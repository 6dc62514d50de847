//! WebHDFS wire protocol: constants, endpoint construction and status classification.
//!
//! Nothing in this module touches the network. The sessions in
//! [`crate::client`] combine these pure helpers with a
//! [`Transport`](crate::transport::Transport) to drive real requests.
//!
//! # Status Codes
//!
//! | Class | Codes | Handling |
//! |-------|-------|----------|
//! | Success | `200`, `201` | Body is the result |
//! | Redirect | `301`, `307` | Follow `Location` (required) |
//! | Remote error | `400`, `401`, `402`, `403`, `404`, `500` | Decode `RemoteException` |
//! | Unexpected | anything else | Protocol error unless an envelope is present |

pub mod endpoint;
pub mod headers;
pub mod status;

pub use endpoint::{build_endpoint, validate_path};
pub use headers::{location, redirect_target};
pub use status::{
    error_for_status, parse_remote_exception, parse_remote_exception_value, StatusClass,
};

/// Protocol constants.
pub mod constants {
    /// Query parameter names.
    pub mod params {
        pub const OP: &str = "op";
        pub const USER_NAME: &str = "user.name";
        pub const OVERWRITE: &str = "overwrite";
        pub const PERMISSION: &str = "permission";
        pub const BLOCKSIZE: &str = "blocksize";
        pub const REPLICATION: &str = "replication";
        pub const BUFFERSIZE: &str = "buffersize";
        pub const OFFSET: &str = "offset";
        pub const LENGTH: &str = "length";
        pub const DESTINATION: &str = "destination";
        pub const CREATE_PARENT: &str = "createParent";
        pub const RECURSIVE: &str = "recursive";
        pub const OWNER: &str = "owner";
        pub const GROUP: &str = "group";
        pub const SOURCES: &str = "sources";
        pub const NEW_LENGTH: &str = "newlength";
        pub const MODIFICATION_TIME: &str = "modificationtime";
        pub const ACCESS_TIME: &str = "accesstime";
        pub const ACL_SPEC: &str = "aclspec";
        pub const SNAPSHOT_NAME: &str = "snapshotname";
        pub const OLD_SNAPSHOT_NAME: &str = "oldsnapshotname";
        pub const RENEWER: &str = "renewer";
        pub const TOKEN: &str = "token";
    }

    /// Status code sets.
    pub mod status {
        pub const SUCCESS: [u16; 2] = [200, 201];
        pub const REDIRECT: [u16; 2] = [301, 307];
        pub const REMOTE_ERROR: [u16; 6] = [400, 401, 402, 403, 404, 500];
    }
}

/// Top-level keys wrapping each JSON response body.
pub mod keys {
    pub const REMOTE_EXCEPTION: &str = "RemoteException";
    pub const FILE_STATUS: &str = "FileStatus";
    pub const FILE_STATUSES: &str = "FileStatuses";
    pub const CONTENT_SUMMARY: &str = "ContentSummary";
    pub const FILE_CHECKSUM: &str = "FileChecksum";
    pub const ACL_STATUS: &str = "AclStatus";
    pub const PATH: &str = "Path";
    pub const BOOLEAN: &str = "boolean";
    pub const LONG: &str = "long";
    pub const TOKEN: &str = "Token";
    pub const TOKENS: &str = "Tokens";
}
