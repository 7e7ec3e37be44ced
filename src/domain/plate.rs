// ==========================================
// 船板质保书校验系统 - 钢板聚合模型
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART C 钢板记录
// 红线: 由提取层一次性填充,本子系统只写判定字段,不增删检测项
// 红线: 规则选择器对钢板只读
// ==========================================

use crate::domain::measurement::{
    Checkable, ChemicalElement, ImpactEnergy, ScalarMeasurement, TextMeasurement,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Plate - 单块钢板的质保书记录
// ==========================================
// 化学元素以符号为键(键唯一); BTreeMap 保证遍历顺序确定,
// 判定输出可复现
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plate {
    // ===== 标识 =====
    pub mill: String,     // 钢厂代码(规则选择器注册键)
    pub plate_no: String, // 钢板号
    pub cert_no: String,  // 质保书编号

    // ===== 声明属性 =====
    pub grade: TextMeasurement,       // 钢级代码
    pub thickness: ScalarMeasurement, // 厚度(mm)
    pub delivery: TextMeasurement,    // 交货状态代码
    pub steelmaking: TextMeasurement, // 冶炼方式代码(部分钢厂质保书无此栏,raw=None)

    // ===== 力学性能 =====
    pub yield_strength: ScalarMeasurement,   // 屈服强度 ReH(MPa)
    pub tensile_strength: ScalarMeasurement, // 抗拉强度 Rm(MPa)
    pub elongation: ScalarMeasurement,       // 伸长率 A(%)

    // ===== 冲击试验 =====
    pub impact_temperature: ScalarMeasurement, // 试验温度(℃)
    pub direction: TextMeasurement,            // 试验方向代码
    pub impact_energies: Vec<ImpactEnergy>,    // 0 条或恰好 4 条

    // ===== 化学成分 =====
    pub elements: BTreeMap<String, ChemicalElement>,
}

impl Plate {
    /// 按符号取化学元素
    pub fn element(&self, symbol: &str) -> Option<&ChemicalElement> {
        self.elements.get(symbol)
    }

    /// 按符号取化学元素(可写,仅供校验引擎回写判定)
    pub fn element_mut(&mut self, symbol: &str) -> Option<&mut ChemicalElement> {
        self.elements.get_mut(symbol)
    }

    /// 钢级代码(原文)
    pub fn grade_code(&self) -> Option<&str> {
        self.grade.raw.as_deref()
    }

    /// 是否带冲击试验记录
    pub fn has_impact_records(&self) -> bool {
        !self.impact_energies.is_empty()
    }

    /// 整板判定: 所有检测项判定的逻辑 AND
    ///
    /// # 规则
    /// - 未被任何规则命中的检测项保持初始乐观值 true,不影响结论
    pub fn all_valid(&self) -> bool {
        let scalars = [
            &self.thickness,
            &self.yield_strength,
            &self.tensile_strength,
            &self.elongation,
            &self.impact_temperature,
        ];
        let texts = [
            &self.grade,
            &self.delivery,
            &self.steelmaking,
            &self.direction,
        ];

        scalars.iter().all(|m| m.validity())
            && texts.iter().all(|m| m.validity())
            && self.elements.values().all(|e| e.validity())
            && self.impact_energies.iter().all(|e| e.validity())
    }

    /// 判定为不合格的检测项清单(报告层用)
    pub fn failed_items(&self) -> Vec<String> {
        let mut failed = Vec::new();

        if !self.grade.validity() {
            failed.push("GRADE".to_string());
        }
        if !self.thickness.validity() {
            failed.push("THICKNESS".to_string());
        }
        if !self.delivery.validity() {
            failed.push("DELIVERY".to_string());
        }
        if !self.steelmaking.validity() {
            failed.push("STEELMAKING".to_string());
        }
        if !self.yield_strength.validity() {
            failed.push("YIELD_STRENGTH".to_string());
        }
        if !self.tensile_strength.validity() {
            failed.push("TENSILE_STRENGTH".to_string());
        }
        if !self.elongation.validity() {
            failed.push("ELONGATION".to_string());
        }
        if !self.impact_temperature.validity() {
            failed.push("IMPACT_TEMPERATURE".to_string());
        }
        if !self.direction.validity() {
            failed.push("DIRECTION".to_string());
        }
        for element in self.elements.values() {
            if !element.validity() {
                failed.push(format!("ELEMENT:{}", element.symbol));
            }
        }
        for energy in &self.impact_energies {
            if !energy.validity() {
                failed.push(format!("IMPACT:{}", energy.slot));
            }
        }

        failed
    }
}
