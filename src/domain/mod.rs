// ==========================================
// 船板质保书校验系统 - 领域模型层
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART B/C 类型与数据体系
// ==========================================
// 职责: 定义钢板记录、检测项与判定字段
// 红线: 不含规则逻辑,不含引擎逻辑
// ==========================================

pub mod measurement;
pub mod plate;
pub mod types;

// 重导出核心类型
pub use measurement::{
    Checkable, ChemicalElement, ImpactEnergy, ScalarMeasurement, TextMeasurement,
};
pub use plate::Plate;
pub use types::{Delivery, Grade, GradeFamily, ImpactSlot, Steelmaking, TestDirection};
