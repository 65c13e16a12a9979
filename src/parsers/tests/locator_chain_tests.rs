use crate::config::SiteSelectors;
use crate::parsers::locators::{
    Locators, by_card_class, by_generic_card, by_name_ascent, by_product_microdata,
    by_url_link_ascent, locate_cards,
};
use crate::parsers::tests::fixtures;
use scraper::Html;

#[cfg(test)]
mod strategy_tests {
    use super::*;

    fn locators() -> Locators {
        Locators::compile(&SiteSelectors::default()).unwrap()
    }

    #[test]
    fn test_card_class_strategy() {
        let doc = Html::parse_document(&fixtures::card_class_page(&[1, 2, 3]));
        assert_eq!(by_card_class(&doc, &locators()).len(), 3);
    }

    #[test]
    fn test_link_ascent_deduplicates_by_url() {
        let doc = Html::parse_document(&fixtures::link_ascent_page(&[1, 2, 2, 3, 1]));
        let cards = by_url_link_ascent(&doc, &locators());
        assert_eq!(cards.len(), 3);
        for card in cards {
            assert!(card.value().classes().any(|c| c == "ProductTile_root__Q1w"));
        }
    }

    #[test]
    fn test_link_ascent_prefers_card_class_stem() {
        // the loose pattern would stop at the inner ProductTile first
        let html = fixtures::page(&format!(
            r#"<div class="ProductCardMain_card__New01">
                <div class="ProductTile_root__Q1w">{}</div>
            </div>"#,
            fixtures::card_body(1)
        ));
        let doc = Html::parse_document(&html);
        let cards = by_url_link_ascent(&doc, &locators());
        assert_eq!(cards.len(), 1);
        assert!(
            cards[0]
                .value()
                .classes()
                .any(|c| c == "ProductCardMain_card__New01")
        );
    }

    #[test]
    fn test_link_ascent_ignores_links_outside_cards() {
        let doc = Html::parse_document(&fixtures::microdata_page(&[1, 2]));
        assert!(by_url_link_ascent(&doc, &locators()).is_empty());
    }

    #[test]
    fn test_product_microdata_strategy() {
        let doc = Html::parse_document(&fixtures::microdata_page(&[1, 2, 3, 4]));
        assert_eq!(by_product_microdata(&doc, &locators()).len(), 4);
    }

    #[test]
    fn test_name_ascent_finds_enclosing_containers() {
        let doc = Html::parse_document(&fixtures::collapsed_card_page(&[1, 2, 3, 4, 5]));
        let cards = by_name_ascent(&doc, &locators());
        assert_eq!(cards.len(), 5);
        for card in cards {
            assert_eq!(
                card.value().attr("itemtype"),
                Some("http://schema.org/Product")
            );
        }
    }

    #[test]
    fn test_name_ascent_uses_loose_class_without_microdata() {
        let html = fixtures::page(
            r#"<div class="CatalogItem_box">
                 <link itemprop="url" href="/product/a"><div itemprop="name">A</div>
               </div>
               <div class="CatalogItem_box">
                 <link itemprop="url" href="/product/b"><div itemprop="name">B</div>
               </div>"#,
        );
        let doc = Html::parse_document(&html);
        assert_eq!(by_name_ascent(&doc, &locators()).len(), 2);
    }

    #[test]
    fn test_name_ascent_skips_names_without_url() {
        let html = fixtures::page(
            r#"<div itemscope itemtype="http://schema.org/Product"><div itemprop="name">A</div></div>"#,
        );
        let doc = Html::parse_document(&html);
        assert!(by_name_ascent(&doc, &locators()).is_empty());
    }

    #[test]
    fn test_generic_card_strategy() {
        let html = fixtures::page(r#"<div class="ProductCard"></div><div class="ProductCard"></div>"#);
        let doc = Html::parse_document(&html);
        assert_eq!(by_generic_card(&doc, &locators()).len(), 2);
    }
}

#[cfg(test)]
mod chain_tests {
    use super::*;

    fn locators() -> Locators {
        Locators::compile(&SiteSelectors::default()).unwrap()
    }

    #[test]
    fn test_primary_strategy_wins() {
        let doc = Html::parse_document(&fixtures::card_class_page(&[1, 2, 3]));
        let cards = locate_cards(&doc, &locators());
        assert_eq!(cards.len(), 3);
        assert!(
            cards[0]
                .value()
                .classes()
                .any(|c| c == "ProductCardMain_card__KQzzn")
        );
    }

    #[test]
    fn test_falls_back_to_link_ascent() {
        let ids: Vec<usize> = (1..=12).collect();
        let doc = Html::parse_document(&fixtures::link_ascent_page(&ids));
        assert_eq!(locate_cards(&doc, &locators()).len(), 12);
    }

    #[test]
    fn test_falls_back_to_product_microdata() {
        let doc = Html::parse_document(&fixtures::microdata_page(&[1, 2, 3]));
        let cards = locate_cards(&doc, &locators());
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|card| card.value().attr("itemtype").is_some()));
    }

    #[test]
    fn test_single_card_triggers_name_reconstruction() {
        let doc = Html::parse_document(&fixtures::collapsed_card_page(&[1, 2, 3, 4]));
        assert_eq!(locate_cards(&doc, &locators()).len(), 4);
    }

    #[test]
    fn test_single_real_card_is_kept() {
        let doc = Html::parse_document(&fixtures::card_class_page(&[7]));
        let cards = locate_cards(&doc, &locators());
        assert_eq!(cards.len(), 1);
        assert!(
            cards[0]
                .value()
                .classes()
                .any(|c| c == "ProductCardMain_card__KQzzn")
        );
    }

    #[test]
    fn test_generic_card_is_last_resort() {
        let html = fixtures::page(
            r#"<div class="ProductCard"><span>a</span></div>
               <div class="ProductCard"><span>b</span></div>
               <div class="ProductCard"><span>c</span></div>"#,
        );
        let doc = Html::parse_document(&html);
        assert_eq!(locate_cards(&doc, &locators()).len(), 3);
    }

    #[test]
    fn test_empty_page() {
        let doc = Html::parse_document(&fixtures::page(""));
        assert!(locate_cards(&doc, &locators()).is_empty());
    }
}
