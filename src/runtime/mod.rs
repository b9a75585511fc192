//! 运行时：启动装配、运行模式与关闭流程

pub mod lifetime;
pub mod modes;
