pub mod graalvm;
pub mod sbt;
