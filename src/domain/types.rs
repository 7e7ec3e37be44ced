// ==========================================
// 船板质保书校验系统 - 领域类型定义
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART B 类型体系
// 依据: CCS《材料与焊接规范》第1篇第3章 - 船体结构用钢
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 钢级家族 (Grade Family)
// ==========================================
// 一般强度(235)与高强度(315/355)两大体系
// 力学性能界限按家族选取,化学成分按家族+厚度档选取
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradeFamily {
    NormalStrength, // 一般强度 A/B/D/E
    HighStrength32, // 高强度 32 系 (AH32/DH32/EH32)
    HighStrength36, // 高强度 36 系 (AH36/DH36/EH36)
}

impl fmt::Display for GradeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeFamily::NormalStrength => write!(f, "NORMAL_STRENGTH"),
            GradeFamily::HighStrength32 => write!(f, "HIGH_STRENGTH_32"),
            GradeFamily::HighStrength36 => write!(f, "HIGH_STRENGTH_36"),
        }
    }
}

// ==========================================
// 钢级 (Grade)
// ==========================================
// 红线: 未识别的钢级不进枚举,由选择器标记 GradeDesignation 无效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    A,
    B,
    D,
    E,
    Ah32,
    Dh32,
    Eh32,
    Ah36,
    Dh36,
    Eh36,
}

impl Grade {
    /// 从质保书钢级代码解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "D" => Some(Grade::D),
            "E" => Some(Grade::E),
            "AH32" => Some(Grade::Ah32),
            "DH32" => Some(Grade::Dh32),
            "EH32" => Some(Grade::Eh32),
            "AH36" => Some(Grade::Ah36),
            "DH36" => Some(Grade::Dh36),
            "EH36" => Some(Grade::Eh36),
            _ => None,
        }
    }

    /// 所属钢级家族
    pub fn family(&self) -> GradeFamily {
        match self {
            Grade::A | Grade::B | Grade::D | Grade::E => GradeFamily::NormalStrength,
            Grade::Ah32 | Grade::Dh32 | Grade::Eh32 => GradeFamily::HighStrength32,
            Grade::Ah36 | Grade::Dh36 | Grade::Eh36 => GradeFamily::HighStrength36,
        }
    }

    /// 冲击试验温度(摄氏度)
    ///
    /// # 规则
    /// - A → +20, B/AH → 0, D/DH → -20, E/EH → -40
    pub fn impact_temperature_c(&self) -> f64 {
        match self {
            Grade::A => 20.0,
            Grade::B | Grade::Ah32 | Grade::Ah36 => 0.0,
            Grade::D | Grade::Dh32 | Grade::Dh36 => -20.0,
            Grade::E | Grade::Eh32 | Grade::Eh36 => -40.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::D => write!(f, "D"),
            Grade::E => write!(f, "E"),
            Grade::Ah32 => write!(f, "AH32"),
            Grade::Dh32 => write!(f, "DH32"),
            Grade::Eh32 => write!(f, "EH32"),
            Grade::Ah36 => write!(f, "AH36"),
            Grade::Dh36 => write!(f, "DH36"),
            Grade::Eh36 => write!(f, "EH36"),
        }
    }
}

// ==========================================
// 交货状态 (Delivery Condition)
// ==========================================
// 质保书代码: AR=轧态 N=正火 TM=控轧控冷 NR=正火轧制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Delivery {
    AsRolled,         // 轧态
    Normalized,       // 正火
    Thermomechanical, // 控轧控冷 (TMCP)
    NormalizedRolled, // 正火轧制
}

impl Delivery {
    /// 从质保书交货状态代码解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AR" => Some(Delivery::AsRolled),
            "N" => Some(Delivery::Normalized),
            "TM" | "TMCP" => Some(Delivery::Thermomechanical),
            "NR" => Some(Delivery::NormalizedRolled),
            _ => None,
        }
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::AsRolled => write!(f, "AR"),
            Delivery::Normalized => write!(f, "N"),
            Delivery::Thermomechanical => write!(f, "TM"),
            Delivery::NormalizedRolled => write!(f, "NR"),
        }
    }
}

// ==========================================
// 冶炼方式 (Steelmaking Route)
// ==========================================
// 仅部分钢厂方案使用(细化元素策略按冶炼方式分档)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Steelmaking {
    Bof, // 转炉
    Eaf, // 电炉
}

impl Steelmaking {
    /// 从质保书冶炼方式代码解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BOF" | "LD" => Some(Steelmaking::Bof),
            "EAF" => Some(Steelmaking::Eaf),
            _ => None,
        }
    }
}

impl fmt::Display for Steelmaking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Steelmaking::Bof => write!(f, "BOF"),
            Steelmaking::Eaf => write!(f, "EAF"),
        }
    }
}

// ==========================================
// 冲击试验方向 (Test Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestDirection {
    Longitudinal, // 纵向
    Transverse,   // 横向
}

impl TestDirection {
    /// 从质保书方向代码解析 (L/T 或全称)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "L" | "LONGITUDINAL" => Some(TestDirection::Longitudinal),
            "T" | "TRANSVERSE" => Some(TestDirection::Transverse),
            _ => None,
        }
    }
}

impl fmt::Display for TestDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestDirection::Longitudinal => write!(f, "L"),
            TestDirection::Transverse => write!(f, "T"),
        }
    }
}

// ==========================================
// 冲击试样槽位 (Impact Slot)
// ==========================================
// 一组冲击试验固定 4 条记录: 3 个单值 + 1 个平均值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactSlot {
    Specimen1,
    Specimen2,
    Specimen3,
    Average,
}

impl ImpactSlot {
    /// 全部槽位(声明顺序即校验顺序)
    pub const ALL: [ImpactSlot; 4] = [
        ImpactSlot::Specimen1,
        ImpactSlot::Specimen2,
        ImpactSlot::Specimen3,
        ImpactSlot::Average,
    ];
}

impl fmt::Display for ImpactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactSlot::Specimen1 => write!(f, "KV1"),
            ImpactSlot::Specimen2 => write!(f, "KV2"),
            ImpactSlot::Specimen3 => write!(f, "KV3"),
            ImpactSlot::Average => write!(f, "KV_AVG"),
        }
    }
}
