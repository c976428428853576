/// Typed views of the documents this subsystem reads and writes. Properties
/// the subsystem never touches are kept in untyped passthrough maps so a
/// patched document round-trips without losing them.

pub mod capture;
pub mod document;
