// ==========================================
// 船板质保书校验系统 - 核心库
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - 系统定位
// 技术栈: Rust 规则引擎库(提取/报告/文件分拣由外围系统承担)
// 系统定位: 质保书合规校验,人工保留最终裁定权
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 钢板记录与检测项
pub mod domain;

// 规则层 - 界限值/细化元素策略/按厂选择器
pub mod rules;

// 引擎层 - 两阶段校验流程
pub mod engine;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Delivery, Grade, GradeFamily, ImpactSlot, Steelmaking, TestDirection};

// 领域实体
pub use domain::{Checkable, ChemicalElement, ImpactEnergy, Plate, ScalarMeasurement, TextMeasurement};

// 规则
pub use rules::{
    ConjunctiveGroup, DisjunctiveGroupSet, ElementBound, FailAnnotationPolicy, GroupMember,
    JgSelector, Limit, RuleSelector, RuleSet, SelectorRegistry, Target, XgSelector,
};

// 引擎
pub use engine::{VerificationEngine, VerificationSummary};

// 错误
pub use error::{VerifyError, VerifyResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "船板质保书校验系统";
