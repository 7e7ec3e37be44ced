// ==========================================
// 船板质保书校验系统 - 规则层
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART D/E/F 规则体系
// ==========================================
// 职责: 界限值判定、细化元素策略组合、按钢厂的规则选择
// 红线: 规则表编译期内置,不做通用规则解释器
// ==========================================

pub mod fine_grain;
pub mod jg;
pub mod limit;
pub mod selector;
pub mod xg;

// 重导出核心类型
pub use fine_grain::{
    ConjunctiveGroup, DisjunctiveGroupSet, ElementBound, FailAnnotationPolicy, GroupMember,
};
pub use jg::JgSelector;
pub use limit::{CombinationFormula, Limit, Target};
pub use selector::{RuleSelector, RuleSet, SelectorRegistry};
pub use xg::XgSelector;
