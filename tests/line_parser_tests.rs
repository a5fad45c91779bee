
#[cfg(test)]
mod tests {
    use crate::test_helpers::{fixture_master_data, input_battery};
    use just_cocktails::line_parser::{
        confidence, format_ingredient_line, parse_ingredient_block, parse_ingredient_line,
    };
    use just_cocktails::types::{AmountStatus, FieldStatus, TokenType};

    #[test]
    fn test_spec_scenarios() {
        let md = fixture_master_data();

        let parsed = parse_ingredient_line("2 cl Bacardi", &md);
        assert_eq!(parsed.amount, Some(2.0));
        assert_eq!(parsed.unit.as_deref(), Some("cl"));
        assert_eq!(parsed.ingredient.as_deref(), Some("Bacardi"));
        assert_eq!(parsed.confidence, 1.0);

        let parsed = parse_ingredient_line("1 Dash Angostora", &md);
        assert_eq!(parsed.ingredient.as_deref(), Some("Angostura Bitters"));

        let parsed = parse_ingredient_line("50% Filler maracuja", &md);
        assert_eq!(parsed.amount, Some(50.0));
        assert_eq!(parsed.unit.as_deref(), Some("Filler"));
        assert_eq!(parsed.ingredient.as_deref(), Some("Maracujasaft"));

        let parsed = parse_ingredient_line("- handvoll Minze", &md);
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.statuses.amount, AmountStatus::Empty);
        assert_eq!(parsed.unit.as_deref(), Some("Handvoll"));
        assert_eq!(parsed.ingredient.as_deref(), Some("Minze"));

        let parsed = parse_ingredient_line("1-2 TL Zuckersirup", &md);
        assert_eq!(parsed.statuses.amount, AmountStatus::Ambiguous);
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.amount_text.as_deref(), Some("1-2"));

        let parsed = parse_ingredient_line("1 - 2 TL Zuckersirup", &md);
        assert_eq!(parsed.statuses.amount, AmountStatus::Ambiguous);
        assert_eq!(parsed.amount_text.as_deref(), Some("1-2"));
        assert_eq!(parsed.tokens[0].text, "1 - 2");
        assert_eq!(parsed.unit.as_deref(), Some("TL"));
    }

    #[test]
    fn test_non_ascii_digits_are_not_amounts() {
        let md = fixture_master_data();
        let parsed = parse_ingredient_line("١ cl Gin", &md);
        assert_eq!(parsed.statuses.amount, AmountStatus::Empty);
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.amount_text, None);
        assert!(parsed.tokens.iter().all(|t| t.token_type != TokenType::Amount));
    }

    #[test]
    fn test_mined_ingredients_resolve() {
        let md = fixture_master_data();

        let parsed = parse_ingredient_line("5 cl Cachaca", &md);
        assert_eq!(parsed.ingredient.as_deref(), Some("Cachaça"));
        assert_eq!(parsed.statuses.ingredient, FieldStatus::Ok);

        let parsed = parse_ingredient_line("2 cl Falernun", &md);
        assert_eq!(parsed.ingredient.as_deref(), Some("Falernum"));
        assert_eq!(parsed.statuses.ingredient, FieldStatus::Ok);
        assert_eq!(parsed.ingredient_raw.as_deref(), Some("Falernun"));
    }

    #[test]
    fn test_filler_variants() {
        let md = fixture_master_data();

        let parsed = parse_ingredient_line("50 % filler (Soda)", &md);
        assert_eq!(parsed.amount_text.as_deref(), Some("50 %"));
        assert_eq!(parsed.unit.as_deref(), Some("Filler"));
        assert_eq!(parsed.unit_raw.as_deref(), Some("filler"));
        assert_eq!(parsed.ingredient.as_deref(), Some("Sodawasser"));
        assert_eq!(parsed.notes, None);

        let parsed = parse_ingredient_line("Filler Ginger Beer", &md);
        assert_eq!(parsed.statuses.amount, AmountStatus::Empty);
        assert_eq!(parsed.unit.as_deref(), Some("Filler"));
        assert_eq!(parsed.ingredient.as_deref(), Some("Ginger Beer"));
    }

    #[test]
    fn test_unknown_ingredient_is_new() {
        let md = fixture_master_data();
        let parsed = parse_ingredient_line("2 cl Blue Curacao (optional)", &md);
        assert_eq!(parsed.statuses.ingredient, FieldStatus::New);
        assert_eq!(parsed.ingredient.as_deref(), Some("Blue Curacao"));
        assert_eq!(parsed.notes.as_deref(), Some("optional"));
        assert_eq!(
            parsed.suggestions.ingredients.len(),
            md.config().suggestion_limit
        );
        // 0.3 + 0.2 + 0.5 * 0.3
        assert_eq!(parsed.confidence, 0.65);
    }

    #[test]
    fn test_punctuation_only_unit_is_missing() {
        let md = fixture_master_data();
        let parsed = parse_ingredient_line("2 ... Gin", &md);
        assert_eq!(parsed.statuses.unit, FieldStatus::Missing);
        assert_eq!(parsed.unit, None);
        assert_eq!(parsed.ingredient.as_deref(), Some("Gin"));
        assert!(parsed.tokens.iter().all(|t| t.token_type != TokenType::Unit));
    }

    #[test]
    fn test_block_parsing_keeps_order() {
        let md = fixture_master_data();
        let parsed = parse_ingredient_block(
            "4 cl Weißer Rum, 1,5 cl Limettensaft\n1 Handvoll Minze (frisch, gezupft)",
            &md,
        );
        let ingredients: Vec<Option<&str>> =
            parsed.iter().map(|p| p.ingredient.as_deref()).collect();
        assert_eq!(
            ingredients,
            vec![Some("Weißer Rum"), Some("Limettensaft"), Some("Minze")]
        );
        assert_eq!(parsed[2].notes.as_deref(), Some("frisch, gezupft"));
    }

    #[test]
    fn test_formatted_line_parses_back() {
        let md = fixture_master_data();
        for line in [
            "2 cl bacardi",
            "1 Dash Angostora (optional)",
            "50% Filler maracuja",
            "1,5 cl Limettensaft",
        ] {
            let parsed = parse_ingredient_line(line, &md);
            let formatted = format_ingredient_line(&parsed);
            let reparsed = parse_ingredient_line(&formatted, &md);
            assert_eq!(reparsed.unit, parsed.unit, "{}", line);
            assert_eq!(reparsed.ingredient, parsed.ingredient, "{}", line);
            assert_eq!(reparsed.notes, parsed.notes, "{}", line);
            assert_eq!(reparsed.statuses.ingredient, FieldStatus::Ok, "{}", line);
        }
    }

    #[test]
    fn test_parsing_is_total_and_tokens_are_well_formed() {
        let md = fixture_master_data();

        for input in input_battery() {
            let parsed = parse_ingredient_line(input, &md);
            assert_eq!(parsed.raw, input);

            let chars: Vec<char> = input.chars().collect();
            let mut previous_end = 0;
            for token in &parsed.tokens {
                assert!(token.start < token.end, "{:?} in {:?}", token, input);
                assert!(token.start >= previous_end, "{:?} in {:?}", token, input);
                assert!(token.end <= chars.len(), "{:?} in {:?}", token, input);
                let text: String = chars[token.start..token.end].iter().collect();
                assert_eq!(text, token.text, "{:?}", input);
                previous_end = token.end;
            }
        }
    }

    #[test]
    fn test_statuses_are_consistent() {
        let md = fixture_master_data();

        for input in input_battery() {
            let parsed = parse_ingredient_line(input, &md);

            assert!((0.0..=1.0).contains(&parsed.confidence), "{:?}", input);
            assert_eq!(parsed.confidence, confidence(&parsed.statuses), "{:?}", input);

            if parsed.amount.is_some() {
                assert_eq!(parsed.statuses.amount, AmountStatus::Ok, "{:?}", input);
            }
            if matches!(
                parsed.statuses.amount,
                AmountStatus::Ambiguous | AmountStatus::Invalid
            ) {
                assert_eq!(parsed.amount, None, "{:?}", input);
            }

            if parsed.statuses.unit.is_resolved() {
                let unit = parsed.unit.as_deref().unwrap_or_default();
                assert!(md.unit_record(unit).is_some(), "{:?}", input);
            }
            assert_eq!(
                parsed.ingredient.is_none(),
                parsed.statuses.ingredient == FieldStatus::Missing,
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_parsed_ingredient_serializes_camel_case() {
        let md = fixture_master_data();
        let parsed = parse_ingredient_line("1 Dash Angostora (kalt)", &md);
        let value = serde_json::to_value(&parsed).unwrap();

        assert_eq!(value["amountText"], "1");
        assert_eq!(value["ingredientRaw"], "Angostora");
        assert_eq!(value["statuses"]["ingredient"], "ok");
        assert_eq!(value["tokens"][3]["type"], "notes");
    }
}
