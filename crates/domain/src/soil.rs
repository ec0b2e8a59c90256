//! # 土壌・施肥
//!
//! 公開データ API に渡す施肥処方の照会条件（[`FertilizerQuery`]）と、
//! 返却される土壌検査結果・施肥処方を表現する。
//!
//! 土壌の各測定値は API の受付範囲に収めてから送る:
//!
//! | パラメータ | 意味 | 範囲 |
//! |-----------|------|------|
//! | `acid` | pH | 4〜9 |
//! | `om` | 有機物 | 5〜300 |
//! | `vldpha` | 有効リン酸 | 5〜1700 |
//! | `posifert_K` | 交換性カリウム | 0.01〜9 |
//! | `posifert_Ca` | 交換性カルシウム | 0.1〜30 |
//! | `posifert_Mg` | 交換性マグネシウム | 0.1〜20 |
//! | `vldsia` | 有効ケイ酸 | 5〜1500 |
//! | `selc` | 電気伝導度 | 0〜10 |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumIter, IntoEnumIterator};

/// 作物コード（5 桁ゼロ埋め）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CropCode(String);

impl CropCode {
   /// 作物コード表の値から作成する（5 桁に満たない場合は先頭をゼロ埋め）
   pub fn from_catalog(raw: &str) -> Self {
      Self(format!("{:0>5}", raw.trim()))
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }
}

/// 土壌の測定項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum SoilMeasurement {
   Acid,
   OrganicMatter,
   AvailablePhosphate,
   Potassium,
   Calcium,
   Magnesium,
   AvailableSilicate,
   ElectricalConductivity,
}

impl SoilMeasurement {
   /// API パラメータ名（リクエストボディのキーと共通）
   pub const fn param_name(self) -> &'static str {
      match self {
         Self::Acid => "acid",
         Self::OrganicMatter => "om",
         Self::AvailablePhosphate => "vldpha",
         Self::Potassium => "posifert_K",
         Self::Calcium => "posifert_Ca",
         Self::Magnesium => "posifert_Mg",
         Self::AvailableSilicate => "vldsia",
         Self::ElectricalConductivity => "selc",
      }
   }

   /// 受付範囲（最小値, 最大値）
   pub const fn range(self) -> (f64, f64) {
      match self {
         Self::Acid => (4.0, 9.0),
         Self::OrganicMatter => (5.0, 300.0),
         Self::AvailablePhosphate => (5.0, 1700.0),
         Self::Potassium => (0.01, 9.0),
         Self::Calcium => (0.1, 30.0),
         Self::Magnesium => (0.1, 20.0),
         Self::AvailableSilicate => (5.0, 1500.0),
         Self::ElectricalConductivity => (0.0, 10.0),
      }
   }

   /// 入力値を受付範囲に収める
   ///
   /// 数値または数値として読める文字列を受け付ける。
   /// 欠落・数値でない値は最小値として扱う。
   pub fn normalize(self, raw: Option<&Value>) -> f64 {
      let (min, max) = self.range();
      let parsed = match raw {
         Some(Value::Number(n)) => n.as_f64(),
         Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
         _ => None,
      };

      match parsed {
         Some(v) if v.is_finite() => v.clamp(min, max),
         _ => min,
      }
   }
}

/// 施肥処方の照会条件
#[derive(Debug, Clone, PartialEq)]
pub struct FertilizerQuery {
   pub crop_code:    CropCode,
   pub measurements: BTreeMap<SoilMeasurement, f64>,
}

impl FertilizerQuery {
   /// リクエストボディから照会条件を組み立てる
   ///
   /// `lookup` はパラメータ名から入力値を引く関数。
   pub fn new<'a>(crop_code: CropCode, lookup: impl Fn(&str) -> Option<&'a Value>) -> Self {
      let measurements = SoilMeasurement::iter()
         .map(|m| (m, m.normalize(lookup(m.param_name()))))
         .collect();

      Self {
         crop_code,
         measurements,
      }
   }

   /// API パラメータ名と値の組を返す
   pub fn params(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
      self.measurements
         .iter()
         .map(|(m, v)| (m.param_name(), *v))
   }
}

/// 土壌検査結果の 1 件（項目名 → 値）
///
/// 項目は提供元 API に依存するため固定しない。
pub type SoilExamRecord = BTreeMap<String, String>;

/// 施肥処方の 1 件
///
/// フィールド名は提供元 API の XML タグ名をそのまま使う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilizerRecommendation {
   #[serde(rename = "crop_Code")]
   pub crop_code:         Option<String>,
   #[serde(rename = "crop_Nm")]
   pub crop_name:         Option<String>,
   #[serde(rename = "pre_Fert_N")]
   pub pre_fert_n:        Option<String>,
   #[serde(rename = "pre_Fert_P")]
   pub pre_fert_p:        Option<String>,
   #[serde(rename = "pre_Fert_K")]
   pub pre_fert_k:        Option<String>,
   #[serde(rename = "post_Fert_N")]
   pub post_fert_n:       Option<String>,
   #[serde(rename = "post_Fert_P")]
   pub post_fert_p:       Option<String>,
   #[serde(rename = "post_Fert_K")]
   pub post_fert_k:       Option<String>,
   #[serde(rename = "pre_Compost_Cattl")]
   pub pre_compost_cattle: Option<String>,
   #[serde(rename = "pre_Compost_Pig")]
   pub pre_compost_pig:   Option<String>,
   #[serde(rename = "pre_Compost_Chick")]
   pub pre_compost_chick: Option<String>,
   #[serde(rename = "pre_Compost_Mix")]
   pub pre_compost_mix:   Option<String>,
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use rstest::rstest;
   use serde_json::json;

   use super::*;

   #[rstest]
   #[case("1", "00001")]
   #[case("4101", "04101")]
   #[case("12345", "12345")]
   #[case(" 77 ", "00077")]
   fn test_作物コードのゼロ埋め(#[case] raw: &str, #[case] expected: &str) {
      assert_eq!(CropCode::from_catalog(raw).as_str(), expected);
   }

   #[rstest]
   #[case(json!(6.5), 6.5)]
   #[case(json!("7"), 7.0)]
   #[case(json!(12), 9.0)]
   #[case(json!(1), 4.0)]
   #[case(json!("abc"), 4.0)]
   #[case(json!(null), 4.0)]
   #[case(json!(true), 4.0)]
   fn test_phの正規化(#[case] raw: Value, #[case] expected: f64) {
      let actual = SoilMeasurement::Acid.normalize(Some(&raw));
      assert!((actual - expected).abs() < f64::EPSILON, "{actual} != {expected}");
   }

   #[test]
   fn test_欠落値は最小値になる() {
      assert!((SoilMeasurement::Potassium.normalize(None) - 0.01).abs() < f64::EPSILON);
      assert!(SoilMeasurement::ElectricalConductivity.normalize(None).abs() < f64::EPSILON);
   }

   #[test]
   fn test_照会条件は全項目を含む() {
      let body = json!({ "acid": 5.5, "om": "1000", "selc": -3 });
      let query = FertilizerQuery::new(CropCode::from_catalog("4101"), |key| body.get(key));

      let params: BTreeMap<_, _> = query.params().collect();

      assert_eq!(params.len(), 8);
      assert_eq!(params["acid"], 5.5);
      assert_eq!(params["om"], 300.0);
      assert_eq!(params["selc"], 0.0);
      assert_eq!(params["vldpha"], 5.0);
   }

   #[test]
   fn test_施肥処方はapiのタグ名でシリアライズされる() {
      let item = FertilizerRecommendation {
         crop_code: Some("04101".to_string()),
         pre_fert_n: Some("10.5".to_string()),
         ..Default::default()
      };

      let json = serde_json::to_value(&item).unwrap();

      assert_eq!(json["crop_Code"], "04101");
      assert_eq!(json["pre_Fert_N"], "10.5");
      assert_eq!(json["pre_Compost_Mix"], Value::Null);
   }
}
