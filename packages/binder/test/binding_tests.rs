/**
 * Binding Tests
 *
 * Template compilation, bind-time validation and bound node patching
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::*;
    use htmel::{BinderConfig, BindingError, Document, Error, State, Template, Value};
    use htmel_dom::{inner_html, HtmlParser};

    mod text {
        use super::*;

        #[test]
        fn should_render_and_update_text_content() {
            let state = State::new().with("a", 1);
            let template = Template::builder()
                .lit("<div>")
                .dynamic(read(&state, "a"))
                .lit("</div>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<div>1</div>");

            state.set("a", 2).unwrap();
            assert_eq!(view.html(), "<div>2</div>");
        }

        #[test]
        fn should_not_bind_entity_encoded_placeholder_text() {
            let state = State::new().with("x", "BOUND");
            let template = Template::builder()
                .lit("<p>&#104;tmel0-0-</p><b>")
                .dynamic(read(&state, "x"))
                .lit("</b>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<p>htmel0-0-</p><b>BOUND</b>");

            state.set("x", "again").unwrap();
            assert_eq!(view.html(), "<p>htmel0-0-</p><b>again</b>");
        }

        #[test]
        fn should_render_large_integral_numbers_in_full() {
            let state = State::new().with("n", 1e20);
            let template = Template::builder()
                .lit("<p>")
                .dynamic(read(&state, "n"))
                .lit("</p>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<p>100000000000000000000</p>");
        }

        #[test]
        fn should_keep_surrounding_text() {
            let state = State::new().with("a", 1).with("b", 2);
            let template = Template::builder()
                .lit("<p>")
                .dynamic(read(&state, "a"))
                .lit(" and ")
                .dynamic(read(&state, "b"))
                .lit("!</p>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<p>1 and 2!</p>");

            state.set("b", "two").unwrap();
            assert_eq!(view.html(), "<p>1 and two!</p>");
        }

        #[test]
        fn should_render_blank_values_as_empty_text() {
            let template = Template::builder()
                .lit("<p>")
                .value(false)
                .lit("|")
                .value(Value::Null)
                .lit("|")
                .value(Value::Undefined)
                .lit("|")
                .value(0)
                .lit("</p>")
                .build();
            let (_dom, view) = bind(template, &[]);
            assert_eq!(view.html(), "<p>|||0</p>");
        }

        #[test]
        fn should_escape_text_values() {
            let template = Template::builder()
                .lit("<p>")
                .value("<b>&</b>")
                .lit("</p>")
                .build();
            let (_dom, view) = bind(template, &[]);
            assert_eq!(view.html(), "<p>&lt;b&gt;&amp;&lt;/b&gt;</p>");
        }

        #[test]
        fn should_render_map_as_string() {
            let map: Value = vec![("a", 1)].into_iter().collect();
            let template = Template::builder().lit("<p>").value(map).lit("</p>").build();
            let (_dom, view) = bind(template, &[]);
            assert_eq!(view.html(), "<p>{\"a\":1}</p>");
        }

        #[test]
        fn should_stringify_values_under_raw_text_parents() {
            let state = State::new().with("rules", vec!["a{}", "b>c{}"]);
            let template = Template::builder()
                .lit("<style>")
                .dynamic(read(&state, "rules"))
                .lit("</style>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<style>a{},b>c{}</style>");
            let style = find_element(&view, "style").unwrap();
            assert_eq!(child_kinds(&view, style), vec!["Text"]);
        }
    }

    mod lists {
        use super::*;

        #[test]
        fn should_materialize_lists_into_a_container() {
            let state = State::new().with("items", vec![1, 2, 3]);
            let template = Template::builder()
                .lit("<div>")
                .dynamic(read(&state, "items"))
                .lit("</div>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            let div = find_element(&view, "div").unwrap();
            assert_eq!(child_kinds(&view, div), vec!["ListContainer"]);
            assert_eq!(view.html(), "<div>123</div>");

            let container = view.dom().borrow().children(div)[0];
            assert_eq!(child_kinds(&view, container), vec!["Text", "Text", "Text"]);

            state.set("items", vec![4]).unwrap();
            assert_eq!(view.dom().borrow().children(div), &[container]);
            assert_eq!(child_kinds(&view, container), vec!["Text"]);
            assert_eq!(view.html(), "<div>4</div>");
        }

        #[test]
        fn should_switch_between_list_and_text() {
            let state = State::new().with("v", vec!["a", "b"]);
            let template = Template::builder()
                .lit("<div>")
                .dynamic(read(&state, "v"))
                .lit("</div>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            let div = find_element(&view, "div").unwrap();

            state.set("v", "plain").unwrap();
            assert_eq!(child_kinds(&view, div), vec!["Text"]);
            assert_eq!(view.html(), "<div>plain</div>");

            state.set("v", vec!["c"]).unwrap();
            assert_eq!(child_kinds(&view, div), vec!["ListContainer"]);
            assert_eq!(view.html(), "<div>c</div>");

            state.set("v", false).unwrap();
            assert_eq!(child_kinds(&view, div), vec!["Text"]);
            assert_eq!(view.html(), "<div></div>");
        }

        #[test]
        fn should_move_node_items_into_the_list() {
            let dom = Document::shared();
            let (b, i) = {
                let mut doc = dom.borrow_mut();
                let b = doc.create_element("b");
                let i = doc.create_element("i");
                (b, i)
            };
            let template = Template::builder()
                .lit("<div>")
                .value(vec![Value::Node(b), Value::from("-"), Value::Null, Value::Node(i)])
                .lit("</div>")
                .build();
            let view = template.bind(&dom, &[], eager()).unwrap();
            assert_eq!(view.html(), "<div><b></b>-<i></i></div>");
        }
    }

    mod nodes {
        use super::*;

        #[test]
        fn should_place_node_values_in_the_tree() {
            let dom = Document::shared();
            let em = {
                let mut doc = dom.borrow_mut();
                let em = doc.create_element("em");
                let text = doc.create_text("hi");
                doc.append_child(em, text);
                em
            };
            let state = State::new().with("content", Value::Node(em));
            let template = Template::builder()
                .lit("<p>")
                .dynamic(read(&state, "content"))
                .lit("</p>")
                .build();
            let view = template.bind(&dom, &[state.clone()], eager()).unwrap();
            assert_eq!(view.html(), "<p><em>hi</em></p>");
            assert_eq!(view.target_of(0), Some(em));

            state.set("content", "text").unwrap();
            assert_eq!(view.html(), "<p>text</p>");
            assert_ne!(view.target_of(0), Some(em));
            assert_eq!(dom.borrow().parent(em), None);
        }
    }

    mod attribute_values {
        use super::*;

        #[test]
        fn should_toggle_boolean_attribute() {
            let state = State::new().with("x", true);
            let template = Template::builder()
                .lit("<input class=\"")
                .dynamic(read(&state, "x"))
                .lit("\">")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<input class>");

            state.set("x", false).unwrap();
            assert_eq!(view.html(), "<input>");

            state.set("x", "wide").unwrap();
            assert_eq!(view.html(), "<input class=\"wide\">");
        }

        #[test]
        fn should_join_multiple_expressions_with_literal_text() {
            let state = State::new().with("a", "x").with("b", "y");
            let template = Template::builder()
                .lit("<p title=\"")
                .dynamic(read(&state, "a"))
                .lit("-")
                .dynamic(read(&state, "b"))
                .lit("\"></p>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<p title=\"x-y\"></p>");
            assert_eq!(view.bound_node_count(), 1);

            state.set("a", "1").unwrap();
            assert_eq!(view.html(), "<p title=\"1-y\"></p>");
            state.set("b", "2").unwrap();
            assert_eq!(view.html(), "<p title=\"1-2\"></p>");
        }

        #[test]
        fn should_coerce_partial_values_to_strings() {
            let template = Template::builder()
                .lit("<p class=\"btn ")
                .value(Value::Undefined)
                .lit(" ")
                .value(true)
                .lit("\"></p>")
                .build();
            let (_dom, view) = bind(template, &[]);
            assert_eq!(view.html(), "<p class=\"btn undefined true\"></p>");
        }

        #[test]
        fn should_keep_attribute_identical_for_unchanged_value() {
            let state = State::new().with("kind", "primary");
            let template = Template::builder()
                .lit("<button class=\"btn ")
                .dynamic(read(&state, "kind"))
                .lit("\"></button>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            let before = view.html();
            state.set("kind", "primary").unwrap();
            state.set("kind", "primary").unwrap();
            assert_eq!(view.html(), before);
            assert_eq!(before, "<button class=\"btn primary\"></button>");
        }

        #[test]
        fn should_assign_structured_values_as_properties() {
            let items = Value::from(vec![1, 2]);
            let template = Template::builder()
                .lit("<ul data-items=\"")
                .value(items.clone())
                .lit("\"></ul>")
                .build();
            let (dom, view) = bind(template, &[]);
            let ul = find_element(&view, "ul").unwrap();
            assert_eq!(view.html(), "<ul></ul>");
            assert_eq!(dom.borrow().property(ul, "data-items"), Some(&items));
        }

        #[test]
        fn should_assign_handlers_outside_event_attributes_as_properties() {
            let template = Template::builder()
                .lit("<div render=\"")
                .handler(|_| Ok(Value::from("rendered")))
                .lit("\"></div>")
                .build();
            let (dom, view) = bind(template, &[]);
            let div = find_element(&view, "div").unwrap();
            let property = dom.borrow().property(div, "render").cloned();
            let result = property.unwrap().as_function().unwrap().call(&[]).unwrap();
            assert_eq!(result, Value::from("rendered"));
            assert!(!view.is_event_handler(0));
        }
    }

    mod attribute_names {
        use super::*;

        #[test]
        fn should_rename_and_remove_bound_attribute() {
            let state = State::new().with("attr", "disabled");
            let template = Template::builder()
                .lit("<input ")
                .dynamic(read(&state, "attr"))
                .lit(">")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<input disabled>");

            state.set("attr", "readonly").unwrap();
            assert_eq!(view.html(), "<input readonly>");

            state.set("attr", false).unwrap();
            assert_eq!(view.html(), "<input>");

            state.set("attr", "").unwrap();
            assert_eq!(view.html(), "<input>");
        }

        #[test]
        fn should_set_one_attribute_per_map_entry() {
            let state = State::new().with("attrs", Value::Null);
            let template = Template::builder()
                .lit("<input ")
                .dynamic(read(&state, "attrs"))
                .lit(">")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<input>");

            let attrs: Value = vec![("type", Value::from("text")), ("required", Value::from(true))]
                .into_iter()
                .collect();
            state.set("attrs", attrs).unwrap();
            assert_eq!(view.html(), "<input type=\"text\" required>");

            state.set("attrs", "hidden").unwrap();
            assert_eq!(view.html(), "<input hidden>");
        }

        #[test]
        fn should_restore_literal_value_after_map_then_name() {
            let attrs: Value = vec![("a", Value::from("1"))].into_iter().collect();
            let state = State::new().with("n", attrs);
            let template = Template::builder()
                .lit("<div ")
                .dynamic(read(&state, "n"))
                .lit("=\"orig\"></div>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<div a=\"1\"></div>");

            state.set("n", "b").unwrap();
            assert_eq!(view.html(), "<div b=\"orig\"></div>");

            state.set("n", "c").unwrap();
            assert_eq!(view.html(), "<div c=\"orig\"></div>");
        }

        #[test]
        fn should_keep_attribute_value_across_renames() {
            let state = State::new().with("name", "data-a");
            let template = Template::builder()
                .lit("<div ")
                .dynamic(read(&state, "name"))
                .lit("=\"x\" id=\"d\"></div>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(view.html(), "<div data-a=\"x\" id=\"d\"></div>");

            state.set("name", "data-b").unwrap();
            assert_eq!(view.html(), "<div data-b=\"x\" id=\"d\"></div>");
        }

        #[test]
        fn should_substitute_partial_attribute_names() {
            let template = Template::builder()
                .lit("<div data-")
                .value("role")
                .lit("=\"1\"></div>")
                .build();
            let (_dom, view) = bind(template, &[]);
            assert_eq!(view.html(), "<div data-role=\"1\"></div>");
        }
    }

    mod errors {
        use super::*;

        fn bind_err(template: Template, config: BinderConfig) -> Error {
            match template.bind(&Document::shared(), &[], config) {
                Ok(_) => panic!("binding should fail"),
                Err(err) => err,
            }
        }

        #[test]
        fn should_reject_tag_name_placeholder() {
            let template = Template::builder().lit("<").value("div").lit(">text").build();
            match bind_err(template, eager()) {
                Error::Binding(BindingError::TagName { excerpt, .. }) => {
                    assert_eq!(excerpt, "<${value}>");
                }
                other => panic!("unexpected error {:?}", other),
            }
        }

        #[test]
        fn should_reject_disallowed_attribute_name() {
            let template = Template::builder().lit("<input ").value("disabled").lit(">").build();
            let err = bind_err(template, eager().with_attribute_name_bindings(false));
            match err {
                Error::Binding(BindingError::AttributeNameDisallowed { excerpt, .. }) => {
                    assert_eq!(excerpt, "<input ${value}>");
                }
                other => panic!("unexpected error {:?}", other),
            }
        }

        #[test]
        fn should_reject_name_and_value_on_one_attribute() {
            let template = Template::builder()
                .lit("<div ")
                .value("a")
                .lit("=\"")
                .dynamic(|| Value::Null)
                .lit("\"></div>")
                .build();
            let err = bind_err(template, eager());
            assert_eq!(
                err.to_string(),
                "Attribute can't be bound in both name and value: <div ${value}=\"${dynamic}\">"
            );
        }

        #[test]
        fn should_reject_multiple_expressions_on_event_attribute() {
            let template = Template::builder()
                .lit("<button onclick=\"")
                .handler(|_| Ok(Value::Undefined))
                .lit(" ")
                .handler(|_| Ok(Value::Undefined))
                .lit("\"></button>")
                .build();
            match bind_err(template, eager()) {
                Error::Binding(BindingError::AmbiguousHandler { attribute, count, .. }) => {
                    assert_eq!(attribute, "onclick");
                    assert_eq!(count, 2);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }

        #[test]
        fn should_reject_placeholder_inside_comment() {
            let template = Template::builder().lit("<p></p><!-- ").value(1).lit(" -->").build();
            assert!(matches!(
                bind_err(template, eager()),
                Error::Binding(BindingError::PlaceholderNotFound { .. })
            ));
        }

        #[test]
        fn should_reject_empty_template() {
            assert!(matches!(
                bind_err(literal(""), eager()),
                Error::Binding(BindingError::EmptyTemplate)
            ));
            assert!(matches!(
                bind_err(literal("  \n\t"), eager()),
                Error::Binding(BindingError::EmptyTemplate)
            ));
        }

        #[test]
        fn should_reject_invalid_config() {
            let config = eager().with_event_prefix("");
            assert!(matches!(bind_err(literal("<p></p>"), config), Error::Config(_)));
        }

        #[test]
        fn should_fail_bind_when_initial_render_fails() {
            let state = State::new();
            let template = Template::builder()
                .lit("<p>")
                .try_dynamic(|| Err(anyhow::anyhow!("boom")))
                .lit("</p>")
                .build();
            let err = match template.bind(&Document::shared(), &[state.clone()], eager()) {
                Ok(_) => panic!("binding should fail"),
                Err(err) => err,
            };
            match err {
                Error::Evaluation { token, source } => {
                    assert_eq!(token, "htmel0-0-");
                    assert_eq!(source.to_string(), "boom");
                }
                other => panic!("unexpected error {:?}", other),
            }
            assert_eq!(state.observer_count(), 0);
        }
    }

    mod view {
        use super::*;

        #[test]
        fn should_equal_direct_parse_without_placeholders() {
            let markup = "<div class=\"a\"><p>x &amp; y</p><br><!--c--></div>text";
            let (_dom, view) = bind(literal(markup), &[]);

            let mut doc = Document::new();
            let result = HtmlParser::new().parse_into(&mut doc, markup, "direct.html");
            assert_eq!(view.html(), inner_html(&doc, result.root));
            assert_eq!(view.bound_node_count(), 0);
        }

        #[test]
        fn should_return_first_element_as_root() {
            let (_dom, view) = bind(literal(" <p>a</p><p>b</p>"), &[]);
            let roots = view.roots();
            assert_eq!(roots.len(), 3);
            assert_eq!(view.root(), Some(roots[1]));
            assert_eq!(outer(&view, roots[1]), "<p>a</p>");
        }

        #[test]
        fn should_have_no_root_for_text_only_template() {
            let (_dom, view) = bind(literal("just text"), &[]);
            assert_eq!(view.root(), None);
            assert_eq!(view.roots().len(), 1);
        }

        #[test]
        fn should_release_observers_when_dropped() {
            let state = State::new().with("a", 1);
            let template = Template::builder()
                .lit("<p>")
                .dynamic(read(&state, "a"))
                .lit("</p>")
                .build();
            let (_dom, view) = bind(template, &[state.clone()]);
            assert_eq!(state.observer_count(), 1);
            drop(view);
            assert_eq!(state.observer_count(), 0);
            state.set("a", 2).unwrap();
        }

        #[test]
        fn should_pick_tokens_that_do_not_collide_with_markup() {
            let template = Template::builder()
                .lit("<p title=\"htmel0-\">")
                .value("v")
                .lit("</p>")
                .build();
            let (_dom, view) = bind(template, &[]);
            assert_eq!(view.token(0).unwrap().as_str(), "htmel1-0-");
            assert_eq!(view.html(), "<p title=\"htmel0-\">v</p>");
        }
    }
}
