// ==========================================
// 船板质保书校验系统 - 检测项模型
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART C 检测项与判定字段
// 红线: 原始值由提取层写入,本子系统只写 valid/message
// 红线: 化学元素换算值随原始值/精度联动,不独立存储
// ==========================================

use crate::domain::types::ImpactSlot;
use serde::{Deserialize, Serialize};

fn default_valid() -> bool {
    true
}

// ==========================================
// Checkable - 可判定检测项
// ==========================================
// 所有检测项共享的判定能力: 写入判定结果并与既有判定按 AND 合并
pub trait Checkable {
    /// 写入一次判定结果
    ///
    /// # 规则
    /// - valid 与既有判定按逻辑 AND 合并(已失败的项不会被改回通过)
    /// - message 追加,不覆盖(同一项可被多条规则命中)
    fn mark(&mut self, pass: bool, message: String);

    /// 当前判定结果
    fn validity(&self) -> bool;
}

/// mark 的公共实现(各检测项字段布局一致,逻辑集中于此)
fn combine_verdict(valid: &mut bool, message: &mut Option<String>, pass: bool, new_msg: String) {
    *valid = *valid && pass;
    match message {
        Some(existing) => {
            existing.push_str("; ");
            existing.push_str(&new_msg);
        }
        None => *message = Some(new_msg),
    }
}

// ==========================================
// ScalarMeasurement - 数值检测项
// ==========================================
// 用途: 厚度/屈服/抗拉/伸长率/冲击温度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarMeasurement {
    pub value: Option<f64>, // 原始值,缺失时为 None(绝不以 0 代替)
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ScalarMeasurement {
    pub fn new(value: Option<f64>) -> Self {
        Self {
            value,
            valid: true,
            message: None,
        }
    }
}

impl Checkable for ScalarMeasurement {
    fn mark(&mut self, pass: bool, message: String) {
        combine_verdict(&mut self.valid, &mut self.message, pass, message);
    }

    fn validity(&self) -> bool {
        self.valid
    }
}

// ==========================================
// TextMeasurement - 文本/枚举检测项
// ==========================================
// 用途: 钢级代码/交货状态/冶炼方式/试验方向
// 原始代码保留为文本,解析到枚举的时机在规则选择器内
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMeasurement {
    pub raw: Option<String>,
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl TextMeasurement {
    pub fn new(raw: Option<&str>) -> Self {
        Self {
            raw: raw.map(|s| s.to_string()),
            valid: true,
            message: None,
        }
    }
}

impl Checkable for TextMeasurement {
    fn mark(&mut self, pass: bool, message: String) {
        combine_verdict(&mut self.valid, &mut self.message, pass, message);
    }

    fn validity(&self) -> bool {
        self.valid
    }
}

// ==========================================
// ImpactEnergy - 冲击功检测项
// ==========================================
// 一块板的冲击记录要么 0 条,要么恰好 4 条(3 单值 + 1 平均)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactEnergy {
    pub slot: ImpactSlot,
    pub value: Option<f64>, // 吸收功(J)
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ImpactEnergy {
    pub fn new(slot: ImpactSlot, value: Option<f64>) -> Self {
        Self {
            slot,
            value,
            valid: true,
            message: None,
        }
    }
}

impl Checkable for ImpactEnergy {
    fn mark(&mut self, pass: bool, message: String) {
        combine_verdict(&mut self.valid, &mut self.message, pass, message);
    }

    fn validity(&self) -> bool {
        self.valid
    }
}

// ==========================================
// ChemicalElement - 化学元素检测项
// ==========================================
// 质保书化学成分按整数读数 + 精度位数记录
// 换算值 derived = round(raw × 10^(-precision), precision)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemicalElement {
    pub symbol: String,          // 元素符号(C/Mn/Si/P/S/Als/Alt/Nb/V/Ti/...)
    pub raw_value: Option<i64>,  // 整数读数
    pub precision: Option<u32>,  // 精度(小数位数)
    pub derived: Option<f64>,    // 换算值(%)
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChemicalElement {
    pub fn new(symbol: &str, raw_value: Option<i64>, precision: Option<u32>) -> Self {
        let mut element = Self {
            symbol: symbol.to_string(),
            raw_value: None,
            precision: None,
            derived: None,
            valid: true,
            message: None,
        };
        element.set_reading(raw_value, precision);
        element
    }

    /// 写入读数并重算换算值
    ///
    /// # 规则
    /// - raw_value 或 precision 任一缺失 → derived = None
    /// - 换算值只能经由本方法产生,不允许外部直接赋值
    pub fn set_reading(&mut self, raw_value: Option<i64>, precision: Option<u32>) {
        self.raw_value = raw_value;
        self.precision = precision;
        self.derived = match (raw_value, precision) {
            (Some(raw), Some(p)) => {
                let scale = 10f64.powi(p as i32);
                Some((raw as f64 / scale * scale).round() / scale)
            }
            _ => None,
        };
    }
}

impl Checkable for ChemicalElement {
    fn mark(&mut self, pass: bool, message: String) {
        combine_verdict(&mut self.valid, &mut self.message, pass, message);
    }

    fn validity(&self) -> bool {
        self.valid
    }
}
