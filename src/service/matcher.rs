use indexmap::IndexSet;

use crate::error::BillingError;
use crate::models::Clause;
use crate::store::ClauseStore;

/// 条款匹配: 按工单声明顺序扫描标签, 第一个命中激活条款的标签胜出
/// 平手规则永远是"先声明的标签赢", 与单价高低、条款长短无关;
/// 未激活或不存在的条款直接跳过继续扫描; 空标签序列返回 None, 不报错
pub async fn match_clause<S: ClauseStore>(
    tags: &[String],
    store: &S,
) -> Result<Option<Clause>, BillingError> {
    if tags.is_empty() {
        return Ok(None);
    }

    // 保序去重: 重复标签只查一次, 不打乱先后次序
    let mut seen: IndexSet<&str> = IndexSet::with_capacity(tags.len());
    for tag in tags {
        if !seen.insert(tag.as_str()) {
            continue;
        }
        if let Some(clause) = store.get_active_clause_by_tag(tag).await? {
            return Ok(Some(clause));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{clause, tags};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn first_tag_in_declared_order_wins() {
        let store = MemoryStore::new();
        store.insert_clause(clause("FLASH_001", "85.00", true));
        store.insert_clause(clause("CHEAP_001", "10.00", true));

        // CHEAP_001 更便宜, 但 FLASH_001 声明在前
        let found = match_clause(&tags(&["FLASH_001", "CHEAP_001"]), &store)
            .await
            .unwrap();
        assert_eq!(found.unwrap().clause_id, "FLASH_001");
    }

    #[tokio::test]
    async fn inactive_and_unknown_tags_are_skipped() {
        let store = MemoryStore::new();
        store.insert_clause(clause("OLD_001", "99.00", false));
        store.insert_clause(clause("FLASH_001", "85.00", true));

        let found = match_clause(&tags(&["no-such-tag", "OLD_001", "FLASH_001"]), &store)
            .await
            .unwrap();
        assert_eq!(found.unwrap().clause_id, "FLASH_001");
    }

    #[tokio::test]
    async fn empty_tag_list_matches_nothing() {
        let store = MemoryStore::new();
        store.insert_clause(clause("FLASH_001", "85.00", true));

        let found = match_clause(&[], &store).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn no_active_clause_at_all_matches_nothing() {
        let store = MemoryStore::new();
        store.insert_clause(clause("OLD_001", "99.00", false));

        let found = match_clause(&tags(&["OLD_001", "unknown"]), &store)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_tags_do_not_change_the_outcome() {
        let store = MemoryStore::new();
        store.insert_clause(clause("FLASH_001", "85.00", true));

        let found = match_clause(&tags(&["unknown", "unknown", "FLASH_001"]), &store)
            .await
            .unwrap();
        assert_eq!(found.unwrap().clause_id, "FLASH_001");
    }
}
