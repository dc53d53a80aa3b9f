/// Application name, used in generated file banners.
pub const APP_NAME: &str = "extsync";

/// Directory (relative to the host application root) holding extensions.
pub const EXTENSIONS_DIR: &str = "extensions";

/// Directory (relative to the host application root) holding skins.
pub const SKINS_DIR: &str = "skins";

/// Entry that marks a directory as a git working copy.
pub const REPO_MARKER: &str = ".git";

/// Source control binary.
pub const GIT_BIN: &str = "git";
