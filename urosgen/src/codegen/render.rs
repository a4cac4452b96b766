//! Main-source rendering.
//!
//! Places the artifact buckets into a full source template using the same
//! placeholder engine as the per-endpoint templates. The built-in template
//! matches the ESP-IDF project skeleton the generated fragments target;
//! callers with their own skeleton pass their own template text.

use std::collections::BTreeMap;

use super::engine::GeneratedArtifact;
use super::templates::fill;

/// Node identity substituted into the rendered source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Node name
    pub node_name: String,
    /// Node namespace (may be empty)
    pub namespace: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            node_name: "node".to_string(),
            namespace: String::new(),
        }
    }
}

/// Render the artifact into a main-source template.
///
/// Template keys: `Headers`, `Variables`, `Callbacks`, `InitializingThings`,
/// `AddCallbacks`, `ExamplePublish`, `Tasks`, `Nodename`, `Namespace`.
#[must_use]
pub fn render_main_source(
    artifact: &GeneratedArtifact,
    template: &str,
    options: &RenderOptions,
) -> String {
    let headers: Vec<String> = artifact
        .required_headers
        .iter()
        .map(|header| format!("#include \"{header}\""))
        .collect();

    let mut mapping = BTreeMap::new();
    mapping.insert("Headers".to_string(), headers.join("\n"));
    mapping.insert(
        "Variables".to_string(),
        artifact.variable_declarations.join("\n"),
    );
    mapping.insert(
        "Callbacks".to_string(),
        artifact.ordered_callbacks().join("\n\n"),
    );
    mapping.insert(
        "InitializingThings".to_string(),
        artifact.ordered_inits().join("\n\n"),
    );
    mapping.insert(
        "AddCallbacks".to_string(),
        artifact.ordered_registrations().join("\n"),
    );
    mapping.insert(
        "ExamplePublish".to_string(),
        artifact.ordered_statements().join("\n\n"),
    );
    // The project skeleton reserves a task slot the engine never populates
    mapping.insert("Tasks".to_string(), String::new());
    mapping.insert("Nodename".to_string(), options.node_name.clone());
    mapping.insert("Namespace".to_string(), options.namespace.clone());

    fill(template, &mapping)
}

/// Built-in main-source template for the ESP-IDF / FreeRTOS project skeleton
pub const DEFAULT_MAIN_TEMPLATE: &str = r#"#include <stdio.h>

/* FreeRTOS and ESP-IDF headers */
#include "freertos/FreeRTOS.h"
#include "freertos/task.h"
#include "esp_log.h"
#include "esp_system.h"

/* micro-ROS headers */
#include <uros_network_interfaces.h>
#include <rcl/rcl.h>
#include <rcl/error_handling.h>
#include <rclc/rclc.h>
#include <rclc/executor.h>

<||Headers||>

/* Error-checking macros for micro-ROS calls */
#define RCCHECK(fn) { rcl_ret_t temp_rc = fn; \
    if((temp_rc != RCL_RET_OK)) { \
        printf("Failed status on line %d: %d. Aborting.\n", __LINE__, (int)temp_rc); \
        vTaskDelete(NULL); \
    } \
}
#define RCSOFTCHECK(fn) { rcl_ret_t temp_rc = fn; \
    if((temp_rc != RCL_RET_OK)) { \
        printf("Failed status on line %d: %d. Continuing.\n", __LINE__, (int)temp_rc); \
    } \
}

<||Variables||>

<||Callbacks||>

void micro_ros_task(void * arg)
{
    rcl_allocator_t allocator = rcl_get_default_allocator();
    rclc_support_t support;

    rcl_init_options_t init_options = rcl_get_zero_initialized_init_options();
    RCCHECK(rcl_init_options_init(&init_options, allocator));
    RCCHECK(rclc_support_init_with_options(&support, 0, NULL, &init_options, &allocator));

    rcl_node_t node;
    RCCHECK(rclc_node_init_default(&node, "<||Nodename||>", "<||Namespace||>", &support));

    <||InitializingThings||>

    rclc_executor_t executor;
    RCCHECK(rclc_executor_init(&executor, &support.context, 1, &allocator));
    <||AddCallbacks||>

    while (1) {
        rclc_executor_spin_some(&executor, RCL_MS_TO_NS(10));
        vTaskDelay(pdMS_TO_TICKS(10));
        <||ExamplePublish||>
    }
}

void app_main(void)
{
    ESP_ERROR_CHECK(uros_network_interface_initialize());

    xTaskCreate(
        micro_ros_task,
        "uros_task",
        CONFIG_MICRO_ROS_APP_STACK,
        NULL,
        CONFIG_MICRO_ROS_APP_TASK_PRIO,
        NULL);
    <||Tasks||>
}
"#;
