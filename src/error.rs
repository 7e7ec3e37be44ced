// ==========================================
// 船板质保书校验系统 - 校验错误类型
// ==========================================
// 依据: Rust 错误处理最佳实践
// 工具: thiserror 派生宏
// ==========================================
// 传播策略: 单板致命错误由调用方逐板捕获,不中断其余钢板;
// 规则表构造缺陷属编程错误,在构造点 panic,不进入本枚举
// ==========================================

use thiserror::Error;

/// 校验模块错误类型
#[derive(Error, Debug)]
pub enum VerifyError {
    // ===== 数据缺失(本板致命,转人工复核) =====
    #[error("检测数据缺失 (板号 {plate_no}): {field}")]
    MissingData { plate_no: String, field: String },

    #[error("冲击记录条数错误 (板号 {plate_no}): 要求 4 条,实际 {actual} 条")]
    ImpactRecordCount { plate_no: String, actual: usize },

    // ===== 枚举值越界(本板致命) =====
    #[error("枚举值越界 (字段 {field}): 未知取值 {value}")]
    UnsupportedEnumeration { field: String, value: String },

    // ===== 规则查找未命中(本板致命) =====
    #[error("未注册的钢厂代码: {mill}")]
    UnknownMill { mill: String },

    #[error("厚度超出规则表范围 (钢级 {grade}): {thickness_mm}mm")]
    ThicknessOutOfRange { grade: String, thickness_mm: f64 },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type VerifyResult<T> = Result<T, VerifyError>;
