#[cfg(test)]
mod tests {
    use nutrigen::pipeline::assemble_document_text;
    use nutrigen::recipe_parser::{parse_amount, parse_ingredient_line, parse_recipe};
    use nutrigen::PipelineError;

    #[test]
    fn test_amount_tokens_yield_exact_rational_values() {
        assert_eq!(parse_amount("1 1/2"), Some(1.5));
        assert_eq!(parse_amount("¾"), Some(0.75));
        assert_eq!(parse_amount("2.25"), Some(2.25));
        assert_eq!(parse_amount("5/8"), Some(0.625));
        assert_eq!(parse_amount("⅖"), Some(0.4));
    }

    #[test]
    fn test_bulleted_document_parses_after_normalization() {
        let pages = vec![
            "Keto Pancakes\nServings: 2\nIngredients\n\u{2022} 1 cup almond flour\n\u{2022} 2 large eggs".to_string(),
            "Instructions\nWhisk everything.\nFry in butter.".to_string(),
        ];
        let text = assemble_document_text(&pages);
        let recipe = parse_recipe(&text, "keto-pancakes.pdf").unwrap();

        assert_eq!(recipe.servings, 2);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].name, "almond flour");
        assert_eq!(recipe.ingredients[1].name, "eggs");
        assert_eq!(
            recipe.instructions,
            vec!["Whisk everything.".to_string(), "Fry in butter.".to_string()]
        );
    }

    #[test]
    fn test_sub_headings_inside_ingredient_section_are_dropped() {
        let text = "Ingredients\n\
                    For the crust:\n\
                    1 1/2 cups almond flour\n\
                    Filling\n\
                    2 large eggs\n\
                    Instructions\n\
                    Bake.\n";
        let recipe = parse_recipe(text, "pie.pdf").unwrap();
        let names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["almond flour", "eggs"]);
    }

    #[test]
    fn test_name_then_amount_then_unit_layout() {
        let parsed = parse_ingredient_line("vegetable oil 2 tbsp").unwrap();
        assert_eq!(parsed.name, "vegetable oil");
        assert_eq!(parsed.amount, Some(2.0));
        assert_eq!(parsed.unit.as_deref(), Some("tbsp"));
    }

    #[test]
    fn test_method_and_directions_headings() {
        for heading in ["Method", "Directions", "INSTRUCTIONS"] {
            let text = format!("Ingredients\n1 cup water\n{}\nStir well.\n", heading);
            let recipe = parse_recipe(&text, "doc").unwrap();
            assert_eq!(recipe.instructions, vec!["Stir well.".to_string()]);
        }
    }

    #[test]
    fn test_document_without_any_ingredients_fails_with_its_name() {
        let err = parse_recipe("Shopping List\n", "shopping-list.pdf").unwrap_err();
        match err {
            PipelineError::ParseFailure { document } => {
                assert_eq!(document, "shopping-list.pdf");
            }
            other => panic!("expected ParseFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_spec_end_to_end_document() {
        let text = "Servings: 4\n\
                    Ingredients\n\
                    1 1/2 cups almond flour\n\
                    2 large eggs\n\
                    1/2 tsp salt\n\
                    Instructions\n\
                    Mix and bake.\n";
        let recipe = parse_recipe(text, "bread.pdf").unwrap();

        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.instructions, vec!["Mix and bake.".to_string()]);

        let expected = [
            ("almond flour", 1.5, "cup"),
            ("eggs", 2.0, "large"),
            ("salt", 0.5, "tsp"),
        ];
        for (line, (name, amount, unit)) in recipe.ingredients.iter().zip(expected) {
            assert_eq!(line.name, name);
            assert_eq!(line.amount, Some(amount));
            assert_eq!(line.unit.as_deref(), Some(unit));
        }
    }
}
