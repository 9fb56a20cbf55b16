//! TalentCircle Common
//!
//! Cross-cutting pieces shared by every TalentCircle binary.

pub mod logging;
