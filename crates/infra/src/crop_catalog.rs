//! # 作物コード表
//!
//! 作物名から施肥処方 API の作物コードを引く。
//!
//! コード表は `crop_name,crop_code` のヘッダーを持つ CSV から読み込む。
//! 列の順序は問わない。

use std::path::Path;

use farmmate_domain::soil::CropCode;

use crate::InfraError;

/// 作物コード表トレイト
pub trait CropCatalog: Send + Sync {
   /// 作物名の一覧（コード表の記載順）
   fn crop_names(&self) -> Vec<String>;

   /// 作物名から作物コードを引く
   fn code_for(&self, crop_name: &str) -> Option<CropCode>;
}

/// インメモリの作物コード表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCropCatalog {
   entries: Vec<(String, CropCode)>,
}

impl InMemoryCropCatalog {
   /// （作物名, コード表の値）の組から作成する
   pub fn new<N, C>(entries: impl IntoIterator<Item = (N, C)>) -> Self
   where
      N: Into<String>,
      C: AsRef<str>,
   {
      Self {
         entries: entries
            .into_iter()
            .map(|(name, code)| (name.into(), CropCode::from_catalog(code.as_ref())))
            .collect(),
      }
   }

   /// CSV テキストから読み込む
   ///
   /// # Errors
   ///
   /// - ヘッダーに `crop_name` / `crop_code` 列がない
   /// - 列数が足りない行がある
   pub fn from_csv(text: &str) -> Result<Self, InfraError> {
      let mut lines = text.lines().filter(|l| !l.trim().is_empty());

      let header: Vec<&str> = lines
         .next()
         .ok_or_else(|| InfraError::invalid_input("作物コード表が空です"))?
         .split(',')
         .map(|c| c.trim().trim_start_matches('\u{feff}'))
         .collect();
      let column = |name: &str| {
         header
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| InfraError::invalid_input(format!("{name} 列がありません")))
      };
      let name_col = column("crop_name")?;
      let code_col = column("crop_code")?;

      let mut entries = Vec::new();
      for (index, line) in lines.enumerate() {
         let cells: Vec<&str> = line.split(',').map(str::trim).collect();
         let (Some(name), Some(code)) = (cells.get(name_col), cells.get(code_col)) else {
            return Err(InfraError::invalid_input(format!(
               "作物コード表の {} 行目の列数が不足しています",
               index + 2
            )));
         };
         entries.push((name.to_string(), code.to_string()));
      }

      Ok(Self::new(entries))
   }

   /// CSV ファイルから読み込む
   pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InfraError> {
      let path = path.as_ref();
      let text = std::fs::read_to_string(path).map_err(|e| {
         InfraError::unexpected(format!("作物コード表を読み込めません ({}): {e}", path.display()))
      })?;
      Self::from_csv(&text)
   }
}

impl CropCatalog for InMemoryCropCatalog {
   fn crop_names(&self) -> Vec<String> {
      self.entries.iter().map(|(name, _)| name.clone()).collect()
   }

   fn code_for(&self, crop_name: &str) -> Option<CropCode> {
      self.entries
         .iter()
         .find(|(name, _)| name == crop_name)
         .map(|(_, code)| code.clone())
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_csvから作物コードを引ける() {
      let catalog =
         InMemoryCropCatalog::from_csv("crop_name,crop_code\n벼,1\n고추,4101\n\n").unwrap();

      assert_eq!(catalog.crop_names(), vec!["벼", "고추"]);
      assert_eq!(catalog.code_for("고추").unwrap().as_str(), "04101");
      assert_eq!(catalog.code_for("벼").unwrap().as_str(), "00001");
      assert!(catalog.code_for("사과").is_none());
   }

   #[test]
   fn test_列の順序は問わない() {
      let catalog = InMemoryCropCatalog::from_csv("\u{feff}crop_code,crop_name\n12,콩\n").unwrap();

      assert_eq!(catalog.code_for("콩").unwrap().as_str(), "00012");
   }

   #[test]
   fn test_ヘッダーが不正ならエラー() {
      assert!(InMemoryCropCatalog::from_csv("name,code\n벼,1\n").is_err());
      assert!(InMemoryCropCatalog::from_csv("").is_err());
   }

   #[test]
   fn test_列数が不足した行はエラー() {
      assert!(InMemoryCropCatalog::from_csv("crop_name,crop_code\n벼\n").is_err());
   }
}
