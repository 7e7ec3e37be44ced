// ==========================================
// 船板质保书校验系统 - 引擎层
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART G 校验流程
// ==========================================
// 职责: 串联规则选择与两阶段判定,给出整板结论
// 红线: 所有判定必须输出 message,结论可解释
// ==========================================

pub mod verifier;

// 重导出核心引擎
pub use verifier::{VerificationEngine, VerificationSummary};
