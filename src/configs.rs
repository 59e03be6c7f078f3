//! Plain CLI-facing argument bundles, converted from `clap::Args` via `From`
//! impls in `cli.rs`. These carry file paths only; the assembler's own
//! tunables live in `crate::config::Config`.

pub struct OverlapConfig {
    pub reads: String,
    pub output: String,
}

pub struct FilterConfig {
    pub reads: String,
    pub overlaps: String,
    pub output: String,
}

pub struct AssembleConfig {
    pub reads: String,
    pub overlaps: Option<String>,
    pub output_prefix: String,
    pub output_dir: String,
    pub write_dot: bool,
}
