// Utilities Module
//
// Helpers shared by the driver that are not part of the analysis engine itself.

/// Path conversion utilities (absolute -> relative Unix-style, module names)
pub mod paths;
