//! 物料目錄與篩選條件

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::{BufferFlag, ItemMaster, ItemType, SkuType};

/// 物料篩選條件
///
/// 空集合代表該維度不設限。各維度之間為 AND 關係。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFilter {
    /// 限定物料代碼
    pub codes: Vec<String>,
    /// 限定等級
    pub grades: Vec<String>,
    /// 限定類別
    pub categories: Vec<String>,
    /// 限定品項類型
    pub item_types: Vec<ItemType>,
    /// 限定 SKU 分類
    pub sku_types: Vec<SkuType>,
    /// 僅緩衝件
    pub buffer_only: bool,
    /// 僅採購件
    pub purchase_items_only: bool,
    /// 僅銷售件
    pub sales_items_only: bool,
    /// 是否包含停用物料（預設排除）
    pub include_disabled: bool,
}

impl ItemFilter {
    /// 創建不設限的篩選條件（仍排除停用物料）
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：限定物料代碼
    pub fn with_codes(mut self, codes: Vec<String>) -> Self {
        self.codes = codes;
        self
    }

    /// 建構器模式：限定等級
    pub fn with_grades(mut self, grades: Vec<String>) -> Self {
        self.grades = grades;
        self
    }

    /// 建構器模式：限定類別
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// 建構器模式：限定品項類型
    pub fn with_item_types(mut self, item_types: Vec<ItemType>) -> Self {
        self.item_types = item_types;
        self
    }

    /// 建構器模式：限定 SKU 分類
    pub fn with_sku_types(mut self, sku_types: Vec<SkuType>) -> Self {
        self.sku_types = sku_types;
        self
    }

    /// 建構器模式：僅保留緩衝件
    pub fn buffer_only(mut self) -> Self {
        self.buffer_only = true;
        self
    }

    /// 建構器模式：僅保留採購件
    pub fn purchase_items_only(mut self) -> Self {
        self.purchase_items_only = true;
        self
    }

    /// 建構器模式：僅保留銷售件
    pub fn sales_items_only(mut self) -> Self {
        self.sales_items_only = true;
        self
    }

    /// 建構器模式：連同停用物料一併納入
    pub fn include_disabled(mut self) -> Self {
        self.include_disabled = true;
        self
    }

    /// 判斷物料是否符合條件
    pub fn matches(&self, item: &ItemMaster) -> bool {
        if item.disabled && !self.include_disabled {
            return false;
        }
        if !self.codes.is_empty() && !self.codes.contains(&item.code) {
            return false;
        }
        if !self.grades.is_empty() {
            match &item.grade {
                Some(grade) if self.grades.contains(grade) => {}
                _ => return false,
            }
        }
        if !self.categories.is_empty() {
            match &item.category {
                Some(category) if self.categories.contains(category) => {}
                _ => return false,
            }
        }
        if !self.item_types.is_empty() {
            match item.item_type {
                Some(item_type) if self.item_types.contains(&item_type) => {}
                _ => return false,
            }
        }
        if !self.sku_types.is_empty() {
            match item.sku_type() {
                Some(sku) if self.sku_types.contains(&sku) => {}
                _ => return false,
            }
        }
        if self.buffer_only && item.buffer_flag != BufferFlag::Buffer {
            return false;
        }
        if self.purchase_items_only && !item.is_purchase_item {
            return false;
        }
        if self.sales_items_only && !item.is_sales_item {
            return false;
        }
        true
    }
}

/// 物料目錄
///
/// 以物料代碼為鍵的主檔集合。採用 BTreeMap 使遍歷順序
/// 固定為代碼升冪，計算結果不受插入順序影響。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    items: BTreeMap<String, ItemMaster>,
}

impl ItemCatalog {
    /// 創建空目錄
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入物料主檔，同代碼覆蓋舊值
    pub fn insert(&mut self, item: ItemMaster) {
        self.items.insert(item.code.clone(), item);
    }

    /// 依代碼查詢物料
    pub fn get(&self, code: &str) -> Option<&ItemMaster> {
        self.items.get(code)
    }

    /// 是否包含指定代碼
    pub fn contains(&self, code: &str) -> bool {
        self.items.contains_key(code)
    }

    /// 物料筆數
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 目錄是否為空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按代碼升冪遍歷全部物料
    pub fn iter(&self) -> impl Iterator<Item = &ItemMaster> {
        self.items.values()
    }

    /// 按代碼升冪列出全部代碼
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// 依篩選條件選出物料（維持代碼升冪）
    pub fn select(&self, filter: &ItemFilter) -> Vec<&ItemMaster> {
        self.items
            .values()
            .filter(|item| filter.matches(item))
            .collect()
    }
}

impl FromIterator<ItemMaster> for ItemCatalog {
    fn from_iter<I: IntoIterator<Item = ItemMaster>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}
